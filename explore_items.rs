/// 查看 EPUB 容器的条目表
///
/// 列出每个条目的类型、id 和路径，并标出哪些条目会被提取为章节

use std::collections::HashSet;
use std::path::PathBuf;

use ebook_shelf_lib::{extract_epub_chapters, EpubContainer, ItemSource};

fn main() {
    let Some(epub_path) = std::env::args_os().nth(1).map(PathBuf::from) else {
        eprintln!("用法: explore_items <book.epub>");
        std::process::exit(2);
    };

    let mut container = match EpubContainer::open(&epub_path) {
        Ok(container) => container,
        Err(e) => {
            eprintln!("✗ 打开 EPUB 失败: {}", e);
            std::process::exit(1);
        }
    };

    println!("✓ EPUB 文件打开成功: {:?}", epub_path);
    println!("  标题: {}", container.title().unwrap_or_else(|| "(无)".to_string()));

    let items = container.items();
    let result = extract_epub_chapters(&mut container);
    let kept: HashSet<&str> = result.value.iter().map(|c| c.title.as_str()).collect();

    println!("\n=== 条目 ===");
    for (idx, item) in items.iter().enumerate() {
        let mark = if kept.contains(item.name.as_str()) { "✓" } else { " " };
        println!("[{:>3}] {} {:<10} {:<24} {}", idx, mark, format!("{:?}", item.kind), item.id, item.name);
    }

    println!("\n=== 统计 ===");
    println!("条目总数: {}", items.len());
    println!("文档条目: {}", items.iter().filter(|i| i.kind.is_document()).count());
    println!("章节: {}", result.value.len());
    for problem in &result.diagnostics {
        println!("✗ {}", problem);
    }
}
