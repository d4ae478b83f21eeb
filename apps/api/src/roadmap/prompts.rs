/// System instruction for the roadmap call. The reply is parsed as one JSON object.
pub const ROADMAP_SYSTEM: &str = "You design learning plans for software developers. \
    Reply with a single JSON object and nothing else: no prose before or after it \
    and no markdown fences.";

/// Builds the roadmap request. The JSON skeleton mirrors `RoadmapDraft` / `RoadmapNode`.
pub fn roadmap_prompt(job_description: &str, career_goal: &str, experience_level: &str) -> String {
    format!(
        r#"Create a detailed learning roadmap for a {experience_level} level developer aiming to become a {career_goal}.

Job Description: {job_description}

Guidelines:
1. Focus on practical, industry-relevant skills.
2. Cover fundamentals before advanced topics.
3. Give realistic time estimates.
4. Suggest concrete project ideas and well-regarded courses.

Respond ONLY with a JSON object of this shape:
{{
  "title": "Learning Roadmap for {career_goal}",
  "description": "One or two sentences describing the path",
  "timeEstimate": "Total duration, e.g. '6 months'",
  "nodes": [
    {{
      "title": "Milestone title",
      "description": "What to learn",
      "timeEstimate": "e.g. '4 weeks'",
      "difficulty": "Beginner | Intermediate | Advanced",
      "skills": ["skill"],
      "courses": [
        {{
          "title": "Course name",
          "provider": "Platform",
          "duration": "Course length",
          "level": "Course difficulty",
          "topics": ["topic"]
        }}
      ],
      "projects": ["Project description"]
    }}
  ]
}}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_inputs() {
        let p = roadmap_prompt("Build APIs", "Backend Engineer", "junior");
        assert!(p.contains("a junior level developer aiming to become a Backend Engineer"));
        assert!(p.contains("Job Description: Build APIs"));
        assert!(p.contains("\"title\": \"Learning Roadmap for Backend Engineer\""));
    }
}
