//! Redis-style glob patterns for `SCAN MATCH`
//!
//! Supports `*`, `?`, `[abc]`, `[^a]`, `[a-z]` and backslash escapes. An
//! unterminated `[` matches itself.

use regex::Regex;

/// Compile a glob into an anchored regex
pub fn glob_to_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let p: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2 + 8);
    out.push_str("(?s)^");

    let mut i = 0;
    while i < p.len() {
        match p[i] {
            '*' => {
                out.push_str(".*");
                i += 1;
            }
            '?' => {
                out.push('.');
                i += 1;
            }
            '\\' if i + 1 < p.len() => {
                push_literal(&mut out, p[i + 1]);
                i += 2;
            }
            '[' => match translate_class(&p, i) {
                Some((class, next)) => {
                    out.push_str(&class);
                    i = next;
                }
                None => {
                    push_literal(&mut out, '[');
                    i += 1;
                }
            },
            c => {
                push_literal(&mut out, c);
                i += 1;
            }
        }
    }

    out.push('$');
    Regex::new(&out)
}

fn push_literal(out: &mut String, c: char) {
    let mut buf = [0u8; 4];
    out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
}

/// Translate the class opening at `start`, returning it and the index just
/// past its closing `]`. A `]` right after the opening is a member.
fn translate_class(p: &[char], start: usize) -> Option<(String, usize)> {
    let mut i = start + 1;
    let mut class = String::from("[");
    if i < p.len() && p[i] == '^' {
        class.push('^');
        i += 1;
    }

    let mut first = true;
    while i < p.len() {
        if p[i] == ']' && !first {
            class.push(']');
            return Some((class, i + 1));
        }
        first = false;

        if p[i] == '\\' && i + 1 < p.len() {
            push_literal(&mut class, p[i + 1]);
            i += 2;
            continue;
        }

        if i + 2 < p.len() && p[i + 1] == '-' && p[i + 2] != ']' {
            // Redis accepts reversed ranges
            let (lo, hi) = if p[i] <= p[i + 2] {
                (p[i], p[i + 2])
            } else {
                (p[i + 2], p[i])
            };
            push_literal(&mut class, lo);
            class.push('-');
            push_literal(&mut class, hi);
            i += 3;
            continue;
        }

        push_literal(&mut class, p[i]);
        i += 1;
    }
    None
}
