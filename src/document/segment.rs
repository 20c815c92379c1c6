//! Splits the plain text of one page into text blocks and tables.

use crate::document::table::render_table;
use crate::document::{table_as_text, DocumentItem};
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::warn;

/// lopdf emits this in place of glyphs whose font encoding it cannot map.
const UNMAPPED_ENCODING_MARKER: &str = "Unimplemented?";

static ENUMERATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:\d{1,3}\s*[.)](?:\s|$)|\(?[A-Ea-e]\)(?:\s|$)|(?i:QUEST[ÃA]O)\b)")
        .expect("enumerator pattern is valid")
});

static CELL_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\t+| {2,}").expect("cell separator pattern is valid"));

pub fn segment_page(page: u32, text: &str) -> Vec<DocumentItem> {
    let mut items = Vec::new();
    for block in split_blocks(text) {
        emit_block(page, &block, &mut items);
    }
    items
}

pub fn needs_review(text: &str) -> bool {
    text.contains('\u{FFFD}') || text.contains(UNMAPPED_ENCODING_MARKER)
}

fn starts_question(line: &str) -> bool {
    ENUMERATOR.is_match(line)
}

fn split_cells(line: &str) -> Vec<String> {
    CELL_SEPARATOR
        .split(line.trim())
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .map(str::to_string)
        .collect()
}

fn split_blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines().map(str::trim_end) {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
            continue;
        }
        if !current.is_empty() && starts_question(line) {
            blocks.push(std::mem::take(&mut current));
        }
        current.push(line);
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

fn emit_block(page: u32, lines: &[&str], items: &mut Vec<DocumentItem>) {
    let mut prose: Vec<&str> = Vec::new();
    let mut index = 0;

    while index < lines.len() {
        let cells = split_cells(lines[index]);
        if cells.len() >= 2 {
            let mut rows = vec![cells];
            let mut next = index + 1;
            while next < lines.len() {
                let candidate = split_cells(lines[next]);
                if candidate.len() != rows[0].len() {
                    break;
                }
                rows.push(candidate);
                next += 1;
            }
            if rows.len() >= 2 {
                flush_prose(page, &mut prose, items);
                items.push(table_item(page, rows));
                index = next;
                continue;
            }
        }
        prose.push(lines[index]);
        index += 1;
    }
    flush_prose(page, &mut prose, items);
}

fn table_item(page: u32, rows: Vec<Vec<String>>) -> DocumentItem {
    match render_table(&rows) {
        Ok(image) => DocumentItem::Table {
            page,
            rows,
            image: Arc::new(image),
        },
        Err(err) => {
            warn!(page, "table kept as text: {err}");
            DocumentItem::Text {
                page,
                text: table_as_text(&rows),
                needs_review: true,
            }
        }
    }
}

fn flush_prose(page: u32, prose: &mut Vec<&str>, items: &mut Vec<DocumentItem>) {
    if prose.is_empty() {
        return;
    }
    let text = prose
        .iter()
        .map(|line| line.trim())
        .collect::<Vec<_>>()
        .join("\n");
    prose.clear();
    if text.is_empty() {
        return;
    }
    let needs_review = needs_review(&text);
    items.push(DocumentItem::Text {
        page,
        text,
        needs_review,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(items: &[DocumentItem]) -> Vec<&str> {
        items
            .iter()
            .filter_map(|item| match item {
                DocumentItem::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn blank_lines_separate_blocks() {
        let items = segment_page(1, "Instruções gerais\nLeia com atenção\n\n\nBoa prova");
        assert_eq!(texts(&items), vec!["Instruções gerais\nLeia com atenção", "Boa prova"]);
        assert!(items.iter().all(|item| item.page() == 1));
    }

    #[test]
    fn enumerators_start_new_blocks() {
        let text = "1. Qual a capital?\n(A) Lisboa\n(B) Brasília\n2) Quanto é 3.5 + 1?\nQUESTÃO 03\nEnunciado";
        let items = segment_page(2, text);
        assert_eq!(
            texts(&items),
            vec!["1. Qual a capital?", "(A) Lisboa", "(B) Brasília", "2) Quanto é 3.5 + 1?", "QUESTÃO 03\nEnunciado"]
        );
    }

    #[test]
    fn years_and_decimals_do_not_split() {
        let items = segment_page(1, "Em 2021. houve\n3.5 metros de chuva");
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn aligned_rows_become_a_table() {
        let text = "Observe a tabela:\nAno    Massa   Volume\n2019   10      2\n2020\t12\t3\nResponda.";
        let items = segment_page(4, text);
        assert_eq!(items.len(), 3);
        assert_eq!(texts(&items), vec!["Observe a tabela:", "Responda."]);
        match &items[1] {
            DocumentItem::Table { page, rows, image } => {
                assert_eq!(*page, 4);
                assert_eq!(rows.len(), 3);
                assert_eq!(rows[0], vec!["Ano", "Massa", "Volume"]);
                assert_eq!(rows[2], vec!["2020", "12", "3"]);
                assert!(image.size()[1] > 3);
            }
            other => panic!("expected table, got {other:?}"),
        }
    }

    #[test]
    fn a_single_spaced_line_stays_prose() {
        let items = segment_page(1, "Nome:    ______\nAssinatura");
        assert_eq!(texts(&items), vec!["Nome:    ______\nAssinatura"]);
    }

    #[test]
    fn unmapped_glyphs_are_flagged_for_review() {
        let items = segment_page(1, "H2O \u{FFFD} reação\n\nok");
        match &items[0] {
            DocumentItem::Text { needs_review, .. } => assert!(needs_review),
            other => panic!("expected text, got {other:?}"),
        }
        match &items[1] {
            DocumentItem::Text { needs_review, .. } => assert!(!needs_review),
            other => panic!("expected text, got {other:?}"),
        }
        assert!(needs_review("x ?Identity-H Unimplemented? y"));
    }

    #[test]
    fn whitespace_only_page_yields_nothing() {
        assert!(segment_page(1, " \n\t\n").is_empty());
    }
}
