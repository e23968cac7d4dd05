use super::*;
use super::html_text;
use encoding_rs::{Encoding, GBK, WINDOWS_1252};
use epub::doc::{EpubDoc, ResourceItem};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read, Seek};

/// 章节最少字符数：规范化后的文本必须超过这个长度才算正文
///
/// 目录页、封面页等短条目会被过滤掉
pub const MIN_CHAPTER_CHARS: usize = 100;

/// 容器条目类型
///
/// 由 manifest 中的 media-type 和 properties 推断
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// XHTML/HTML 文档
    Document,
    /// NCX 目录或 EPUB3 导航文档（`properties="nav"`）
    Navigation,
    /// 样式表
    Style,
    Image,
    Font,
    Other,
}

impl ItemKind {
    /// 根据 manifest 条目推断类型
    ///
    /// EPUB3 的导航文档本身是 XHTML，只能通过 `nav` 属性和正文区分
    pub fn from_manifest(media_type: &str, properties: Option<&str>) -> Self {
        let is_nav = properties
            .map(|props| props.split_whitespace().any(|prop| prop == "nav"))
            .unwrap_or(false);

        if is_nav {
            ItemKind::Navigation
        } else {
            Self::from_media_type(media_type)
        }
    }

    pub fn from_media_type(media_type: &str) -> Self {
        let media_type = media_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match media_type.as_str() {
            "application/xhtml+xml" | "text/html" => ItemKind::Document,
            "application/x-dtbncx+xml" => ItemKind::Navigation,
            "text/css" => ItemKind::Style,
            m if m.starts_with("image/") => ItemKind::Image,
            m if m.starts_with("font/")
                || m.starts_with("application/font-")
                || m.starts_with("application/x-font")
                || m == "application/vnd.ms-opentype" =>
            {
                ItemKind::Font
            }
            _ => ItemKind::Other,
        }
    }

    /// 是否为文本文档条目（只有这类条目参与章节提取）
    pub fn is_document(self) -> bool {
        matches!(self, ItemKind::Document)
    }
}

/// 容器内的一个条目（不含内容）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerItem {
    /// manifest 中的 id
    pub id: String,
    /// 条目相对于包文档（OPF）所在目录的路径，即 manifest 中的 href
    pub name: String,
    pub kind: ItemKind,
}

/// 可枚举条目的文档容器
pub trait ItemSource {
    /// 按容器顺序列出所有条目
    fn items(&self) -> Vec<ContainerItem>;

    /// 读取条目的原始字节
    fn content(&mut self, id: &str) -> Result<Vec<u8>>;
}

/// 基于 `epub` crate 的 EPUB 容器
pub struct EpubContainer<R: Read + Seek> {
    doc: EpubDoc<R>,
}

impl EpubContainer<BufReader<File>> {
    /// 打开 EPUB 文件
    pub fn open(path: &Path) -> Result<Self> {
        let doc = EpubDoc::new(path)
            .map_err(|e| LibraryError::Epub(format!("{}: {}", path.display(), e)))?;
        Ok(Self { doc })
    }
}

impl<R: Read + Seek> EpubContainer<R> {
    /// 第一个 Dublin Core 标题，原样返回
    ///
    /// 缺失或只有空白时返回 None
    pub fn title(&self) -> Option<String> {
        self.doc
            .mdata("title")
            .map(|item| item.value.clone())
            .filter(|title| !title.trim().is_empty())
    }
}

/// `epub` crate 把 href 拼在 OPF 所在目录之后，这里去掉该前缀
fn to_container_item(root_base: &Path, id: &str, resource: &ResourceItem) -> ContainerItem {
    let href = resource.path.strip_prefix(root_base).unwrap_or(resource.path.as_path());

    ContainerItem {
        id: id.to_string(),
        name: href.to_string_lossy().replace('\\', "/"),
        kind: ItemKind::from_manifest(&resource.mime, resource.properties.as_deref()),
    }
}

impl<R: Read + Seek> ItemSource for EpubContainer<R> {
    /// 容器顺序：先按 spine（阅读顺序），再是不在 spine 中的文档条目，最后是其余条目。
    /// 后两组按名称排序
    fn items(&self) -> Vec<ContainerItem> {
        let mut seen = HashSet::new();
        let mut ordered = Vec::with_capacity(self.doc.resources.len());

        for spine_item in &self.doc.spine {
            if let Some(resource) = self.doc.resources.get(&spine_item.idref) {
                if seen.insert(spine_item.idref.as_str()) {
                    ordered.push(to_container_item(&self.doc.root_base, &spine_item.idref, resource));
                }
            }
        }

        let mut rest: Vec<ContainerItem> = self
            .doc
            .resources
            .iter()
            .filter(|(id, _)| !seen.contains(id.as_str()))
            .map(|(id, resource)| to_container_item(&self.doc.root_base, id, resource))
            .collect();
        rest.sort_by(|a, b| {
            (!a.kind.is_document(), &a.name).cmp(&(!b.kind.is_document(), &b.name))
        });

        ordered.extend(rest);
        ordered
    }

    fn content(&mut self, id: &str) -> Result<Vec<u8>> {
        self.doc
            .get_resource(id)
            .map(|(bytes, _mime)| bytes)
            .ok_or_else(|| LibraryError::MissingItem(id.to_string()))
    }
}

/// 把条目字节解码为文本
///
/// 编码判断顺序：
/// 1. BOM
/// 2. XML 声明中的 `encoding`（按声明严格解码，失败则继续往下）
/// 3. 严格 UTF-8
/// 4. GBK 特征检测
/// 5. windows-1252（任何字节都能解码）
fn decode_item(name: &str, bytes: &[u8]) -> String {
    if let Some((encoding, bom_length)) = Encoding::for_bom(bytes) {
        return encoding
            .decode_without_bom_handling(&bytes[bom_length..])
            .0
            .into_owned();
    }

    if let Some(encoding) = declared_encoding(bytes) {
        if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(bytes) {
            return text.into_owned();
        }
        tracing::debug!("EPUB item {} is not valid {} as declared", name, encoding.name());
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }

    let fallback = if looks_like_gbk(bytes) { GBK } else { WINDOWS_1252 };
    tracing::debug!("EPUB item {} decoded as {}", name, fallback.name());
    fallback.decode_without_bom_handling(bytes).0.into_owned()
}

/// 读取 `<?xml ... encoding="..."?>` 中声明的编码
///
/// 声明本身是按 ASCII 读出来的，所以不兼容 ASCII 的编码（如无 BOM 的 UTF-16）一律忽略
fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(1024)];
    let head = head.strip_prefix(b"<?xml")?;
    let end = head.windows(2).position(|pair| pair == b"?>")?;
    let declaration = std::str::from_utf8(&head[..end]).ok()?;

    let rest = &declaration[declaration.find("encoding")? + "encoding".len()..];
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let rest = &rest[1..];
    let label = &rest[..rest.find(quote)?];

    Encoding::for_label(label.trim().as_bytes()).filter(|encoding| encoding.is_ascii_compatible())
}

/// 检测字节序列是否像 GBK 编码
///
/// GBK 编码特征：
/// - 第一字节范围：0x81-0xFE
/// - 第二字节范围：0x40-0xFE
fn looks_like_gbk(bytes: &[u8]) -> bool {
    let mut gbk_pairs = 0;
    let mut total_pairs = 0;

    let mut i = 0;
    while i < bytes.len().saturating_sub(1) {
        let b1 = bytes[i];
        let b2 = bytes[i + 1];

        if b1 < 0x80 {
            i += 1;
            continue;
        }

        total_pairs += 1;

        if (0x81..=0xFE).contains(&b1) && (0x40..=0xFE).contains(&b2) {
            gbk_pairs += 1;
            i += 2;
        } else {
            i += 1;
        }
    }

    // 超过一半的非 ASCII 字节对符合 GBK 规则
    total_pairs > 0 && (gbk_pairs as f32 / total_pairs as f32) > 0.5
}

/// 规范化文本是否足够长，可以作为章节
fn is_substantial(text: &str) -> bool {
    text.chars().count() > MIN_CHAPTER_CHARS
}

/// 提取 EPUB 章节
///
/// 遍历容器中的文档条目，规范化其文本，只保留长度超过 [`MIN_CHAPTER_CHARS`] 的条目。
/// 单个条目读取失败时跳过该条目并记录诊断信息，其余条目照常提取；
/// 编码无法确定的条目按 [`decode_item`] 的回退顺序解码，不会被丢弃
///
/// # 参数
/// - `source`: 文档容器
///
/// # 返回
/// 按容器顺序排列的章节
pub fn extract_epub_chapters<S: ItemSource + ?Sized>(source: &mut S) -> Partial<Vec<Chapter>> {
    let mut result = Partial::clean(Vec::new());

    for item in source.items().into_iter().filter(|item| item.kind.is_document()) {
        let bytes = match source.content(&item.id) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Skipping EPUB item {}: {}", item.name, e);
                result.push(e);
                continue;
            }
        };

        let markup = decode_item(&item.name, &bytes);
        let content = html_text::normalize(&markup);
        if !is_substantial(&content) {
            tracing::debug!("Skipping short EPUB item {} ({} chars)", item.name, content.chars().count());
            continue;
        }

        result.value.push(Chapter {
            title: item.name,
            content,
        });
    }

    result
}

/// EPUB 解析器
#[derive(Clone)]
pub struct EpubParser;

impl EpubParser {
    pub fn new() -> Self {
        Self
    }
}

impl Parser for EpubParser {
    fn parse(&self, file_path: &Path) -> Result<Partial<BookContent>> {
        let mut container = EpubContainer::open(file_path)?;
        let chapters = extract_epub_chapters(&mut container);

        tracing::debug!(
            "EPUB parsed - {}: {} chapters, {} skipped items",
            file_path.display(),
            chapters.value.len(),
            chapters.diagnostics.len()
        );

        Ok(chapters.map(|chapters| BookContent::Epub { chapters }))
    }

    fn book_type(&self) -> BookType {
        BookType::Epub
    }

    fn supported_extensions(&self) -> Vec<&str> {
        vec!["epub"]
    }
}

impl Default for EpubParser {
    fn default() -> Self {
        Self::new()
    }
}
