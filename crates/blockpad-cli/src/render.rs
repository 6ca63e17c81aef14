//! Plain-text rendering of a page for the terminal.

use std::fmt::Write;

use blockpad_types::{Block, BlockType, Page, TableContent, is_blank_content};

/// Header, metadata line and every block of a page.
pub fn render_page(page: &Page) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}  [{}]", page.display_name(), page.id.short());

    let mut meta = Vec::new();
    if let Some(status) = page.status {
        meta.push(format!("status: {}", status));
    }
    if let Some(due) = &page.due_date {
        meta.push(format!("due: {}", due));
    }
    if let Some(parent) = &page.parent_id {
        meta.push(format!("parent: {}", parent.short()));
    }
    if !meta.is_empty() {
        let _ = writeln!(out, "{}", meta.join("  "));
    }
    out.push('\n');

    for block in &page.content {
        out.push_str(&render_block(block));
    }
    out
}

/// One block, markdown-flavoured, newline-terminated.
pub fn render_block(block: &Block) -> String {
    if let Some(grid) = block.grid() {
        return render_table(grid);
    }
    let text = block.text().unwrap_or_default();
    let text = if is_blank_content(text) { "" } else { text };

    let line = match block.kind {
        BlockType::Heading1 => format!("# {}", text),
        BlockType::Heading2 => format!("## {}", text),
        BlockType::Todo => {
            let mark = if block.is_checked() { 'x' } else { ' ' };
            format!("[{}] {}", mark, text)
        }
        BlockType::BulletedListItem => format!("- {}", text),
        BlockType::Blockquote => format!("> {}", text),
        BlockType::Code => format!("```\n{}\n```", text),
        BlockType::Divider => "---".to_string(),
        BlockType::Image if text.is_empty() => "![image]()".to_string(),
        BlockType::Image => format!("![image]({})", text),
        BlockType::Paragraph | BlockType::Table => text.to_string(),
        other => format!("<{}> {}", other.as_str(), text),
    };
    line + "\n"
}

fn render_table(grid: &TableContent) -> String {
    let mut out = String::new();
    for (i, row) in grid.rows.iter().enumerate() {
        let cells: Vec<&str> = row.cells.iter().map(|c| c.content.as_str()).collect();
        let _ = writeln!(out, "| {} |", cells.join(" | "));
        if i == 0 && grid.has_headers {
            let rule = vec!["---"; cells.len()].join(" | ");
            let _ = writeln!(out, "| {} |", rule);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockpad_types::PageStatus;

    #[test]
    fn test_render_text_blocks() {
        assert_eq!(render_block(&Block::new(BlockType::Heading1, "Title")), "# Title\n");
        assert_eq!(render_block(&Block::todo("ship it", true)), "[x] ship it\n");
        assert_eq!(render_block(&Block::todo("later", false)), "[ ] later\n");
        assert_eq!(render_block(&Block::new(BlockType::Divider, "")), "---\n");
        assert_eq!(render_block(&Block::paragraph("<br>")), "\n");
    }

    #[test]
    fn test_render_table_with_header_rule() {
        let mut grid = TableContent::from_strings(vec![vec!["a", "b"], vec!["1", "2"]]);
        grid.has_headers = true;
        assert_eq!(
            render_block(&Block::table(grid)),
            "| a | b |\n| --- | --- |\n| 1 | 2 |\n"
        );
    }

    #[test]
    fn test_render_page_metadata() {
        let mut page = Page::new("Plan").with_content(vec![Block::paragraph("go")]);
        page.status = Some(PageStatus::InProgress);
        page.due_date = Some("2025-01-31".into());
        let text = render_page(&page);
        assert!(text.starts_with("Plan  ["));
        assert!(text.contains("status: in-progress  due: 2025-01-31"));
        assert!(text.ends_with("go\n"));
    }
}
