//! Positioned pages → PDF bytes.
//!
//! Only the standard Helvetica faces are referenced, with WinAnsi encoding, so nothing is
//! embedded. The document carries no creation date or random id: the same pages always
//! encode to the same bytes.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::render::layout::{Mark, Page, PAGE_HEIGHT_PT, PAGE_WIDTH_PT};
use crate::render::metrics::Font;
use crate::render::RenderError;

const RULE_WIDTH_PT: f32 = 0.75;

pub fn encode(pages: &[Page]) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut fonts = lopdf::Dictionary::new();
    for font in [Font::Helvetica, Font::HelveticaBold] {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(font.resource_name(), font_id);
    }
    let resources_id = doc.add_object(dictionary! {
        "Font" => fonts,
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let content = Content {
            operations: page_operations(page),
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id: ObjectId = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH_PT.into(), PAGE_HEIGHT_PT.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

fn page_operations(page: &Page) -> Vec<Operation> {
    let mut ops = Vec::new();
    for mark in &page.marks {
        match mark {
            Mark::Text {
                text,
                font,
                size_pt,
                x,
                y,
            } => {
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new(
                    "Tf",
                    vec![font.resource_name().into(), (*size_pt).into()],
                ));
                ops.push(Operation::new("Td", vec![(*x).into(), (*y).into()]));
                ops.push(Operation::new(
                    "Tj",
                    vec![Object::string_literal(encode_win_ansi(text))],
                ));
                ops.push(Operation::new("ET", vec![]));
            }
            Mark::Rule { x_start, x_end, y } => {
                ops.push(Operation::new("w", vec![RULE_WIDTH_PT.into()]));
                ops.push(Operation::new("m", vec![(*x_start).into(), (*y).into()]));
                ops.push(Operation::new("l", vec![(*x_end).into(), (*y).into()]));
                ops.push(Operation::new("S", vec![]));
            }
        }
    }
    ops
}

/// Maps text onto WinAnsiEncoding. Unrepresentable characters become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7e}' => c as u8,
            '\t' | '\n' | '\r' => b' ',
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '\u{20ac}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201c}' => 0x93,
            '\u{201d}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2122}' => 0x99,
            _ => b'?',
        })
        .collect()
}

/// Every string shown with `Tj`, page by page. Bytes are read back as Latin-1.
#[cfg(test)]
pub(crate) fn shown_text(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).unwrap();
    let mut out = Vec::new();
    for (_, page_id) in doc.get_pages() {
        let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
        for op in content.operations {
            if op.operator == "Tj" {
                if let Some(Object::String(raw, _)) = op.operands.first() {
                    out.push(raw.iter().map(|&b| b as char).collect());
                }
            }
        }
    }
    out
}
