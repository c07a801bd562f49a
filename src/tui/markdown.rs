//! README → ratatui `Text`.
//!
//! Markdown files go through `pulldown_cmark`; fenced code inside them and
//! any other file type are highlighted with `syntect`, chosen by fence token
//! or file extension. Unknown types are shown verbatim.

use std::path::Path;
use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const THEME: &str = "base16-ocean.dark";
const TAB: &str = "    ";

/// Render README `content` read from `path`.
pub fn render_readme(content: &str, path: &str, base_fg: Color) -> Text<'static> {
    if is_markdown(path) {
        return render_markdown(content, base_fg);
    }
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    match SYNTAX_SET.find_syntax_by_extension(ext) {
        Some(syntax) if !ext.is_empty() => Text::from(highlight(content, syntax)),
        _ => Text::from(
            content
                .lines()
                .map(|l| Line::styled(l.replace('\t', TAB), Style::default().fg(base_fg)))
                .collect::<Vec<_>>(),
        ),
    }
}

fn is_markdown(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    lower.ends_with(".md") || lower.ends_with(".markdown")
}

fn theme() -> Option<&'static Theme> {
    THEME_SET.themes.get(THEME)
}

/// Highlight `code` line by line. Falls back to plain lines if the theme is
/// missing or a line fails to highlight.
fn highlight(code: &str, syntax: &SyntaxReference) -> Vec<Line<'static>> {
    let Some(theme) = theme() else {
        return code.lines().map(|l| Line::raw(l.replace('\t', TAB))).collect();
    };
    let mut highlighter = HighlightLines::new(syntax, theme);
    LinesWithEndings::from(code)
        .map(|line| match highlighter.highlight_line(line, &SYNTAX_SET) {
            Ok(ranges) => Line::from(
                ranges
                    .into_iter()
                    .filter_map(|(style, fragment)| {
                        let fragment = fragment.trim_end_matches(['\n', '\r']).replace('\t', TAB);
                        if fragment.is_empty() {
                            return None;
                        }
                        let fg = Color::Rgb(style.foreground.r, style.foreground.g, style.foreground.b);
                        Some(Span::styled(fragment, Style::default().fg(fg)))
                    })
                    .collect::<Vec<_>>(),
            ),
            Err(_) => Line::raw(line.trim_end_matches(['\n', '\r']).replace('\t', TAB)),
        })
        .collect()
}

pub fn render_markdown(content: &str, base_fg: Color) -> Text<'static> {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TASKLISTS);
    opts.insert(Options::ENABLE_TABLES);

    let mut md = MarkdownText::new(base_fg);
    for event in Parser::new_ext(content, opts) {
        md.event(event);
    }
    md.finish()
}

/// Fenced or indented code being collected until the block closes.
struct CodeBlock {
    lang: String,
    body: String,
}

struct MarkdownText {
    lines: Vec<Line<'static>>,
    base_fg: Color,
    /// Inline styles; each entry already includes its parents.
    inline: Vec<Style>,
    /// Prefixes for every new line (quote bars, list continuation indent).
    indents: Vec<Span<'static>>,
    /// None = bullet, Some(n) = next ordinal.
    lists: Vec<Option<u64>>,
    code: Option<CodeBlock>,
    links: Vec<String>,
    in_table_cell: bool,
    pending_gap: bool,
}

impl MarkdownText {
    fn new(base_fg: Color) -> Self {
        Self {
            lines: Vec::new(),
            base_fg,
            inline: Vec::new(),
            indents: Vec::new(),
            lists: Vec::new(),
            code: None,
            links: Vec::new(),
            in_table_cell: false,
            pending_gap: false,
        }
    }

    fn finish(self) -> Text<'static> {
        Text::from(self.lines)
    }

    fn current(&self) -> Style {
        self.inline
            .last()
            .copied()
            .unwrap_or_else(|| Style::default().fg(self.base_fg))
    }

    fn push_inline(&mut self, overlay: Style) {
        let style = self.current().patch(overlay);
        self.inline.push(style);
    }

    fn new_line(&mut self) {
        self.lines.push(Line::from(self.indents.clone()));
    }

    fn append(&mut self, span: Span<'static>) {
        if self.lines.is_empty() {
            self.new_line();
        }
        if let Some(line) = self.lines.last_mut() {
            line.spans.push(span);
        }
    }

    fn start_block(&mut self) {
        if self.pending_gap {
            self.lines.push(Line::default());
            self.pending_gap = false;
        }
    }

    fn dim(&self) -> Style {
        Style::default().fg(Color::DarkGray)
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.text(text),
            Event::Code(code) => {
                let style = Style::default().fg(Color::Indexed(203)).bg(Color::Indexed(236));
                self.append(Span::styled(code.to_string(), style));
            }
            Event::SoftBreak => self.append(Span::raw(" ")),
            Event::HardBreak => self.new_line(),
            Event::Rule => {
                self.start_block();
                let rule = Span::styled("─".repeat(32), self.dim());
                self.lines.push(Line::from(rule));
                self.pending_gap = true;
            }
            Event::TaskListMarker(done) => {
                self.append(Span::raw(if done { "[✓] " } else { "[ ] " }));
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                self.start_block();
                self.new_line();
            }
            Tag::Heading { level, .. } => {
                self.start_block();
                self.new_line();
                self.push_inline(heading_style(level));
            }
            Tag::BlockQuote(_) => {
                self.start_block();
                self.indents.push(Span::styled("┃ ", self.dim()));
                self.push_inline(Style::default().add_modifier(Modifier::ITALIC));
            }
            Tag::CodeBlock(kind) => {
                self.start_block();
                let lang = match kind {
                    CodeBlockKind::Fenced(lang) => lang.split(',').next().unwrap_or("").trim().to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                self.code = Some(CodeBlock {
                    lang,
                    body: String::new(),
                });
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.start_block();
                }
                self.lists.push(start);
            }
            Tag::Item => {
                let depth = self.lists.len().saturating_sub(1);
                let bullet = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let b = format!("{n}. ");
                        *n += 1;
                        b
                    }
                    _ => "• ".to_string(),
                };
                self.new_line();
                self.append(Span::raw("  ".repeat(depth)));
                self.append(Span::styled(bullet, self.dim()));
            }
            Tag::Table(_) => self.start_block(),
            Tag::TableHead | Tag::TableRow => self.new_line(),
            Tag::TableCell => {
                if self.in_table_cell {
                    self.append(Span::styled(" │ ", self.dim()));
                }
                self.in_table_cell = true;
            }
            Tag::Emphasis => self.push_inline(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_inline(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => self.push_inline(Style::default().add_modifier(Modifier::CROSSED_OUT)),
            Tag::Link { dest_url, .. } => {
                self.links.push(dest_url.to_string());
                self.push_inline(Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED));
            }
            Tag::Image { dest_url, .. } => {
                self.links.push(dest_url.to_string());
                self.push_inline(Style::default().fg(Color::Cyan));
                self.append(Span::styled("[image: ", self.current()));
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph | TagEnd::Table => self.pending_gap = true,
            TagEnd::Heading(_) => {
                self.inline.pop();
                self.pending_gap = true;
            }
            TagEnd::BlockQuote(_) => {
                self.indents.pop();
                self.inline.pop();
                self.pending_gap = true;
            }
            TagEnd::CodeBlock => self.flush_code(),
            TagEnd::List(_) => {
                self.lists.pop();
                if self.lists.is_empty() {
                    self.pending_gap = true;
                }
            }
            TagEnd::TableHead | TagEnd::TableRow => self.in_table_cell = false,
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.inline.pop();
            }
            TagEnd::Link => {
                self.inline.pop();
                if let Some(url) = self.links.pop() {
                    self.append(Span::styled(format!(" <{url}>"), self.dim()));
                }
            }
            TagEnd::Image => {
                self.append(Span::styled("]", self.current()));
                self.inline.pop();
                self.links.pop();
            }
            _ => {}
        }
    }

    fn text(&mut self, text: CowStr<'_>) {
        if let Some(code) = self.code.as_mut() {
            code.body.push_str(&text);
            return;
        }
        let style = self.current();
        self.append(Span::styled(text.replace('\t', TAB), style));
    }

    fn flush_code(&mut self) {
        let Some(block) = self.code.take() else {
            return;
        };
        let gutter = Span::styled("  ", Style::default());
        let body = block.body.trim_end_matches('\n');
        let lines = match SYNTAX_SET.find_syntax_by_token(&block.lang) {
            Some(syntax) if !block.lang.is_empty() => highlight(body, syntax),
            _ => body
                .lines()
                .map(|l| Line::styled(l.replace('\t', TAB), Style::default().fg(Color::White)))
                .collect(),
        };
        for line in lines {
            let mut spans = self.indents.clone();
            spans.push(gutter.clone());
            spans.extend(line.spans);
            self.lines.push(Line::from(spans));
        }
        self.pending_gap = true;
    }
}

fn heading_style(level: HeadingLevel) -> Style {
    let style = Style::default().add_modifier(Modifier::BOLD);
    match level {
        HeadingLevel::H1 => style.fg(Color::Indexed(230)).bg(Color::Indexed(62)),
        HeadingLevel::H2 => style.fg(Color::Indexed(39)),
        HeadingLevel::H3 => style.fg(Color::Indexed(63)),
        _ => style.fg(Color::Indexed(35)),
    }
}
