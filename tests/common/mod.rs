//! 测试用的 EPUB / PDF 构造工具

#![allow(dead_code)]

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// manifest 中的一个条目
struct ManifestItem {
    id: String,
    href: String,
    media_type: String,
    properties: Option<String>,
    content: Vec<u8>,
    in_spine: bool,
}

/// 内存中的 EPUB 构造器
///
/// 有条目带 `properties` 时按 EPUB3 写包文档，否则按 EPUB2
pub struct EpubBuilder {
    title: Option<String>,
    items: Vec<ManifestItem>,
}

impl EpubBuilder {
    pub fn new() -> Self {
        Self {
            title: None,
            items: Vec::new(),
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// 加入 spine 中的 XHTML 文档
    pub fn chapter(self, id: &str, href: &str, body: &str) -> Self {
        self.item(id, href, "application/xhtml+xml", xhtml(body).into_bytes(), true)
    }

    /// 加入不在 spine 中的 XHTML 文档
    pub fn loose_document(self, id: &str, href: &str, body: &str) -> Self {
        self.item(id, href, "application/xhtml+xml", xhtml(body).into_bytes(), false)
    }

    /// 加入 EPUB3 导航文档（`properties="nav"`），可选择是否放进 spine
    pub fn nav_document(mut self, id: &str, href: &str, body: &str, in_spine: bool) -> Self {
        self = self.item(id, href, "application/xhtml+xml", xhtml(body).into_bytes(), in_spine);
        if let Some(item) = self.items.last_mut() {
            item.properties = Some("nav".to_string());
        }
        self
    }

    pub fn stylesheet(self, id: &str, href: &str, css: &str) -> Self {
        self.item(id, href, "text/css", css.as_bytes().to_vec(), false)
    }

    pub fn item(mut self, id: &str, href: &str, media_type: &str, content: Vec<u8>, in_spine: bool) -> Self {
        self.items.push(ManifestItem {
            id: id.to_string(),
            href: href.to_string(),
            media_type: media_type.to_string(),
            properties: None,
            content,
            in_spine,
        });
        self
    }

    fn package_document(&self) -> String {
        let title = self
            .title
            .as_ref()
            .map(|t| format!("    <dc:title>{}</dc:title>\n", t))
            .unwrap_or_default();

        let manifest: String = self
            .items
            .iter()
            .map(|item| {
                let properties = item
                    .properties
                    .as_ref()
                    .map(|p| format!(" properties=\"{}\"", p))
                    .unwrap_or_default();
                format!(
                    "    <item id=\"{}\" href=\"{}\" media-type=\"{}\"{}/>\n",
                    item.id, item.href, item.media_type, properties
                )
            })
            .collect();

        let spine: String = self
            .items
            .iter()
            .filter(|item| item.in_spine)
            .map(|item| format!("    <itemref idref=\"{}\"/>\n", item.id))
            .collect();

        let version = if self.items.iter().any(|item| item.properties.is_some()) {
            "3.0"
        } else {
            "2.0"
        };

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="{}" unique-identifier="bookid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf">
{}    <dc:identifier id="bookid">urn:uuid:5d1c7f1e-0000-4000-8000-000000000001</dc:identifier>
    <dc:language>en</dc:language>
  </metadata>
  <manifest>
{}  </manifest>
  <spine>
{}  </spine>
</package>
"#,
            version, title, manifest, spine
        )
    }

    pub fn build(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Stored);

        zip.start_file("mimetype", options).unwrap();
        zip.write_all(b"application/epub+zip").unwrap();

        zip.start_file("META-INF/container.xml", options).unwrap();
        zip.write_all(CONTAINER_XML.as_bytes()).unwrap();

        zip.start_file("OEBPS/content.opf", options).unwrap();
        zip.write_all(self.package_document().as_bytes()).unwrap();

        for item in &self.items {
            zip.start_file(format!("OEBPS/{}", item.href), options).unwrap();
            zip.write_all(&item.content).unwrap();
        }

        zip.finish().unwrap().into_inner()
    }

    pub fn write_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, self.build()).unwrap();
    }
}

const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#;

pub fn xhtml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>Section</title></head>
<body>
{}
</body>
</html>
"#,
        body
    )
}

/// 一段超过章节阈值的正文
pub fn long_text(sentence: &str) -> String {
    vec![sentence; 6].join(" ")
}

/// 只含一页、一行文字的最小 PDF
pub fn minimal_pdf(text: &str) -> Vec<u8> {
    pdf_with_pages(&[text])
}

/// 每页一行文字的 PDF
pub fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
    let pages: Vec<(&str, bool)> = pages.iter().map(|text| (*text, true)).collect();
    build_pdf(&pages)
}

/// 第 `broken` 页（从 1 开始）缺少 MediaBox，文本提取到这一页会失败
pub fn pdf_with_unreadable_page(pages: &[&str], broken: usize) -> Vec<u8> {
    let pages: Vec<(&str, bool)> = pages
        .iter()
        .enumerate()
        .map(|(i, text)| (*text, i + 1 != broken))
        .collect();
    build_pdf(&pages)
}

/// 按 (文字, 是否带 MediaBox) 逐页构造 PDF，xref 偏移按实际字节计算
///
/// 对象编号：1 Catalog，2 Pages，3 字体，之后每页依次是页面对象和内容流
fn build_pdf(pages: &[(&str, bool)]) -> Vec<u8> {
    let kids: Vec<String> = (0..pages.len()).map(|i| format!("{} 0 R", 4 + i * 2)).collect();
    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids.join(" "), pages.len()),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];

    for (i, (text, has_media_box)) in pages.iter().enumerate() {
        let media_box = if *has_media_box { "/MediaBox [0 0 612 792] " } else { "" };
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R {}/Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            media_box,
            5 + i * 2
        ));
        let stream = format!("BT /F1 18 Tf 72 720 Td ({}) Tj ET", text);
        objects.push(format!("<< /Length {} >>\nstream\n{}\nendstream", stream.len(), stream));
    }

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::new();
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_start = pdf.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        xref.push_str(&format!("{:010} 00000 n \n", offset));
    }
    pdf.extend_from_slice(xref.as_bytes());
    pdf.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_start
        )
        .as_bytes(),
    );
    pdf
}
