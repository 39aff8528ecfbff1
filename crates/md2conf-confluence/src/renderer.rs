//! Markdown to Confluence storage format.
//!
//! [`markdown_to_storage`] parses `CommonMark` (plus GFM tables,
//! strikethrough and task lists) with pulldown-cmark and writes Confluence
//! XHTML storage format:
//!
//! - Fenced and indented code blocks become the `code` macro, body in CDATA
//! - Blockquotes become the `info` panel macro
//! - Images become `ac:image` with `ri:url` or `ri:attachment`
//! - Void elements are self-closing (`<br />`, `<hr />`)
//!
//! Rendering is a pure function of the input text.

use std::fmt::Write;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

/// Convert Markdown text to Confluence storage format.
#[must_use]
pub fn markdown_to_storage(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    StorageRenderer::new().render(Parser::new_ext(markdown, options))
}

/// Renders pulldown-cmark events to Confluence storage format.
pub struct StorageRenderer {
    out: String,
    in_code_block: bool,
    in_table_head: bool,
    /// Alt text of the image being rendered; text events are swallowed.
    in_image: bool,
}

impl Default for StorageRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageRenderer {
    /// Create an empty renderer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            out: String::with_capacity(4096),
            in_code_block: false,
            in_table_head: false,
            in_image: false,
        }
    }

    /// Consume parser events and return the rendered body.
    pub fn render<'a, I>(mut self, events: I) -> String
    where
        I: Iterator<Item = Event<'a>>,
    {
        for event in events {
            match event {
                Event::Start(tag) => self.start_tag(tag),
                Event::End(tag) => self.end_tag(tag),
                Event::Text(text) => self.text(&text),
                Event::Code(code) => {
                    self.out.push_str("<code>");
                    escape_xml(&code, &mut self.out);
                    self.out.push_str("</code>");
                }
                Event::Html(html) | Event::InlineHtml(html) => self.out.push_str(&html),
                Event::SoftBreak => self.out.push('\n'),
                Event::HardBreak => self.out.push_str("<br />"),
                Event::Rule => self.out.push_str("<hr />"),
                Event::TaskListMarker(checked) => {
                    self.out.push_str(if checked { "[x] " } else { "[ ] " });
                }
                _ => {}
            }
        }
        self.out
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.out.push_str("<p>"),
            Tag::Heading { level, .. } => {
                write!(self.out, "<h{}>", heading_number(level)).unwrap();
            }
            Tag::BlockQuote(_) => self.out.push_str(
                r#"<ac:structured-macro ac:name="info" ac:schema-version="1"><ac:rich-text-body>"#,
            ),
            Tag::CodeBlock(kind) => {
                self.in_code_block = true;
                self.out
                    .push_str(r#"<ac:structured-macro ac:name="code" ac:schema-version="1">"#);
                if let CodeBlockKind::Fenced(info) = kind
                    && let Some(lang) = info.split_whitespace().next()
                {
                    self.out.push_str(r#"<ac:parameter ac:name="language">"#);
                    escape_xml(lang, &mut self.out);
                    self.out.push_str("</ac:parameter>");
                }
                self.out.push_str("<ac:plain-text-body><![CDATA[");
            }
            Tag::List(Some(1)) => self.out.push_str("<ol>"),
            Tag::List(Some(start)) => write!(self.out, r#"<ol start="{start}">"#).unwrap(),
            Tag::List(None) => self.out.push_str("<ul>"),
            Tag::Item => self.out.push_str("<li>"),
            Tag::Table(_) => self.out.push_str("<table><tbody>"),
            Tag::TableHead => {
                self.in_table_head = true;
                self.out.push_str("<tr>");
            }
            Tag::TableRow => self.out.push_str("<tr>"),
            Tag::TableCell => {
                self.out
                    .push_str(if self.in_table_head { "<th>" } else { "<td>" });
            }
            Tag::Emphasis => self.out.push_str("<em>"),
            Tag::Strong => self.out.push_str("<strong>"),
            Tag::Strikethrough => self.out.push_str("<s>"),
            Tag::Link { dest_url, .. } => {
                self.out.push_str("<a href=\"");
                escape_xml(&dest_url, &mut self.out);
                self.out.push_str("\">");
            }
            Tag::Image { dest_url, .. } => {
                self.in_image = true;
                self.image(&dest_url);
            }
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.out.push_str("</p>"),
            TagEnd::Heading(level) => {
                write!(self.out, "</h{}>", heading_number(level)).unwrap();
            }
            TagEnd::BlockQuote(_) => self
                .out
                .push_str("</ac:rich-text-body></ac:structured-macro>"),
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.out
                    .push_str("]]></ac:plain-text-body></ac:structured-macro>");
            }
            TagEnd::List(true) => self.out.push_str("</ol>"),
            TagEnd::List(false) => self.out.push_str("</ul>"),
            TagEnd::Item => self.out.push_str("</li>"),
            TagEnd::Table => self.out.push_str("</tbody></table>"),
            TagEnd::TableHead => {
                self.in_table_head = false;
                self.out.push_str("</tr>");
            }
            TagEnd::TableRow => self.out.push_str("</tr>"),
            TagEnd::TableCell => {
                self.out
                    .push_str(if self.in_table_head { "</th>" } else { "</td>" });
            }
            TagEnd::Emphasis => self.out.push_str("</em>"),
            TagEnd::Strong => self.out.push_str("</strong>"),
            TagEnd::Strikethrough => self.out.push_str("</s>"),
            TagEnd::Link => self.out.push_str("</a>"),
            TagEnd::Image => self.in_image = false,
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.in_image {
            return;
        }
        if self.in_code_block {
            // "]]>" would terminate the CDATA section early
            self.out.push_str(&text.replace("]]>", "]]]]><![CDATA[>"));
        } else {
            escape_xml(text, &mut self.out);
        }
    }

    fn image(&mut self, src: &str) {
        self.out.push_str("<ac:image>");
        if src.starts_with("http://") || src.starts_with("https://") {
            self.out.push_str(r#"<ri:url ri:value=""#);
            escape_xml(src, &mut self.out);
        } else {
            let filename = src.rsplit('/').next().unwrap_or(src);
            self.out.push_str(r#"<ri:attachment ri:filename=""#);
            escape_xml(filename, &mut self.out);
        }
        self.out.push_str(r#"" /></ac:image>"#);
    }
}

fn heading_number(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Append `s` to `out` with XML special characters escaped.
fn escape_xml(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}
