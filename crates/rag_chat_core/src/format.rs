//! crates/rag_chat_core/src/format.rs
//!
//! The markdown-lite formatter used for every message, chunk and document
//! preview body.
//!
//! The input is scanned in three passes: fenced code blocks are cut out first,
//! the remaining lines are classified as list items or text, and inline spans
//! are substituted last on already-escaped text. Code block contents never
//! reach the later passes, and every user character is escaped before a tag is
//! introduced, so the only markup in the output is the markup inserted here.

const FENCE: &str = "```";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    fn tag(self) -> &'static str {
        match self {
            ListKind::Unordered => "ul",
            ListKind::Ordered => "ol",
        }
    }
}

#[derive(Debug)]
enum Block {
    Code {
        language: Option<String>,
        code: String,
    },
    Item {
        kind: ListKind,
        content: String,
    },
    Text(String),
}

#[derive(Debug)]
enum Piece {
    /// A line of running text; consecutive inline pieces are joined by `<br>`.
    Inline(String),
    /// A block element; never gets a `<br>` on either side.
    Block(String),
}

/// Converts the supported markdown subset into sanitized HTML.
///
/// Supported: fenced code blocks with an optional language tag, inline code,
/// `**bold**`/`__bold__`, `*italic*`/`_italic_`, `-`/`*`/`+` unordered lists,
/// `N.` ordered lists and line breaks. Malformed markup degrades to escaped
/// text.
pub fn format_message(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n");
    let blocks = scan_blocks(&normalized);
    join_pieces(render_blocks(blocks))
}

/// Escapes the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

//=========================================================================================
// Pass 1 + 2: fence scan and line classification
//=========================================================================================

fn scan_blocks(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut lines = text.split('\n');
    // Text left over after a closing fence on the same line.
    let mut carry: Option<String> = None;

    loop {
        let line = match carry.take() {
            Some(line) => line,
            None => match lines.next() {
                Some(line) => line.to_string(),
                None => break,
            },
        };

        let Some(open) = line.find(FENCE) else {
            blocks.push(classify_line(&line));
            continue;
        };

        let prefix = &line[..open];
        if !prefix.trim().is_empty() {
            blocks.push(classify_line(prefix));
        }
        let after = &line[open + FENCE.len()..];

        if let Some(close) = after.find(FENCE) {
            blocks.push(Block::Code {
                language: None,
                code: after[..close].to_string(),
            });
            let rest = &after[close + FENCE.len()..];
            if !rest.trim().is_empty() {
                carry = Some(rest.to_string());
            }
            continue;
        }

        let tag = after.trim();
        let (language, mut code) = if tag.is_empty() {
            (None, String::new())
        } else if is_language_tag(tag) {
            (Some(tag.to_string()), String::new())
        } else {
            (None, format!("{after}\n"))
        };

        // An unclosed fence runs to the end of the input.
        for next in lines.by_ref() {
            if let Some(close) = next.find(FENCE) {
                code.push_str(&next[..close]);
                let rest = &next[close + FENCE.len()..];
                if !rest.trim().is_empty() {
                    carry = Some(rest.to_string());
                }
                break;
            }
            code.push_str(next);
            code.push('\n');
        }

        blocks.push(Block::Code { language, code });
    }

    blocks
}

fn is_language_tag(tag: &str) -> bool {
    tag.chars().all(|c| c.is_alphanumeric() || c == '_')
}

fn classify_line(line: &str) -> Block {
    let trimmed = line.trim_start();
    let mut chars = trimmed.chars();

    if let (Some(marker), Some(next)) = (chars.next(), chars.next()) {
        if matches!(marker, '-' | '*' | '+') && next.is_whitespace() {
            return Block::Item {
                kind: ListKind::Unordered,
                content: trimmed[marker.len_utf8()..].trim_start().to_string(),
            };
        }
    }

    let digits = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &trimmed[digits..];
        if let Some(after_dot) = rest.strip_prefix('.') {
            if after_dot.starts_with(char::is_whitespace) {
                return Block::Item {
                    kind: ListKind::Ordered,
                    content: after_dot.trim_start().to_string(),
                };
            }
        }
    }

    Block::Text(line.to_string())
}

//=========================================================================================
// Block rendering
//=========================================================================================

fn render_blocks(blocks: Vec<Block>) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut open_list: Option<(ListKind, String)> = None;

    for block in blocks {
        match block {
            Block::Item { kind, content } => {
                let item = format!("<li>{}</li>", format_inline(&escape_html(&content)));
                match open_list.as_mut() {
                    Some((open_kind, items)) if *open_kind == kind => items.push_str(&item),
                    _ => {
                        close_list(&mut open_list, &mut pieces);
                        open_list = Some((kind, item));
                    }
                }
            }
            Block::Code { language, code } => {
                close_list(&mut open_list, &mut pieces);
                pieces.push(Piece::Block(render_code(language.as_deref(), &code)));
            }
            Block::Text(text) => {
                close_list(&mut open_list, &mut pieces);
                pieces.push(Piece::Inline(format_inline(&escape_html(&text))));
            }
        }
    }
    close_list(&mut open_list, &mut pieces);

    pieces
}

fn close_list(open_list: &mut Option<(ListKind, String)>, pieces: &mut Vec<Piece>) {
    if let Some((kind, items)) = open_list.take() {
        let tag = kind.tag();
        pieces.push(Piece::Block(format!("<{tag}>{items}</{tag}>")));
    }
}

fn render_code(language: Option<&str>, code: &str) -> String {
    let body = escape_html(code.trim_start_matches('\n').trim_end());
    match language {
        Some(language) => format!(
            "<pre><code class=\"language-{}\">{}</code></pre>",
            escape_html(language),
            body
        ),
        None => format!("<pre><code>{body}</code></pre>"),
    }
}

fn join_pieces(pieces: Vec<Piece>) -> String {
    let mut html = String::new();
    let mut previous_inline = false;

    for (i, piece) in pieces.iter().enumerate() {
        match piece {
            Piece::Block(block) => {
                html.push_str(block);
                previous_inline = false;
            }
            Piece::Inline(line) => {
                let touches_block = matches!(pieces.get(i + 1), Some(Piece::Block(_)))
                    || (i > 0 && matches!(pieces[i - 1], Piece::Block(_)));
                if line.is_empty() && touches_block {
                    continue;
                }
                if previous_inline {
                    html.push_str("<br>");
                }
                html.push_str(line);
                previous_inline = true;
            }
        }
    }

    html
}

//=========================================================================================
// Pass 3: inline spans (input is already escaped)
//=========================================================================================

fn format_inline(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < len {
        let c = chars[i];

        if c == '`' {
            if let Some(end) = find_char(&chars, '`', i + 1) {
                if end > i + 1 {
                    out.push_str("<code>");
                    out.extend(&chars[i + 1..end]);
                    out.push_str("</code>");
                    i = end + 1;
                    continue;
                }
            }
        }

        if (c == '*' || c == '_') && chars.get(i + 1) == Some(&c) {
            if let Some(end) = find_double(&chars, c, i + 2) {
                let bounded =
                    c == '*' || (opens_underscore(&chars, i) && closes_underscore(&chars, end + 2));
                if end > i + 2 && bounded {
                    let inner: String = chars[i + 2..end].iter().collect();
                    out.push_str("<strong>");
                    out.push_str(&format_inline(&inner));
                    out.push_str("</strong>");
                    i = end + 2;
                    continue;
                }
            }
            out.push(c);
            out.push(c);
            i += 2;
            continue;
        }

        if c == '*' || c == '_' {
            if let Some(end) = find_single(&chars, c, i + 1) {
                let bounded =
                    c == '*' || (opens_underscore(&chars, i) && closes_underscore(&chars, end + 1));
                if end > i + 1 && !chars[i + 1].is_whitespace() && bounded {
                    let inner: String = chars[i + 1..end].iter().collect();
                    out.push_str("<em>");
                    out.push_str(&format_inline(&inner));
                    out.push_str("</em>");
                    i = end + 1;
                    continue;
                }
            }
        }

        out.push(c);
        i += 1;
    }

    out
}

fn find_char(chars: &[char], c: char, start: usize) -> Option<usize> {
    (start..chars.len()).find(|&j| chars[j] == c)
}

fn find_double(chars: &[char], c: char, start: usize) -> Option<usize> {
    (start..chars.len().saturating_sub(1)).find(|&j| chars[j] == c && chars[j + 1] == c)
}

/// Finds a lone marker, skipping doubled ones that belong to bold spans.
fn find_single(chars: &[char], c: char, start: usize) -> Option<usize> {
    (start..chars.len()).find(|&j| {
        chars[j] == c
            && chars.get(j + 1) != Some(&c)
            && (j == 0 || chars[j - 1] != c)
    })
}

/// `_` only opens emphasis at a word boundary, so `snake_case_names` survive.
fn opens_underscore(chars: &[char], at: usize) -> bool {
    at == 0 || !chars[at - 1].is_alphanumeric()
}

fn closes_underscore(chars: &[char], after: usize) -> bool {
    after >= chars.len() || !chars[after].is_alphanumeric()
}
