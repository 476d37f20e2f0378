//! A small parser for the literal subset of JavaScript used by bundler config files.
//!
//! Understands object and array literals, strings (single, double and backtick quotes
//! without interpolation), numbers, booleans, `null`, identifiers with member access
//! (`path.resolve`, `import.meta.url`), call expressions and `new` expressions. Anything
//! else is a parse error.

/// A parsed literal value.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Literal {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Literal>),
    /// Object entries in source order.
    Object(Vec<(String, Literal)>),
    /// Identifier or member path, e.g. `__dirname`, `import.meta.url`.
    Ident(String),
    /// `callee(args...)`; `new URL(...)` has the callee `new URL`.
    Call { callee: String, args: Vec<Literal> },
}

impl Literal {
    /// Look up a key of an object literal.
    pub(crate) fn get(&self, key: &str) -> Option<&Literal> {
        match self {
            Self::Object(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Ident(_) => "identifier",
            Self::Call { .. } => "call expression",
        }
    }

    /// Convert parsed JSON, keeping key order.
    pub(crate) fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n.as_f64().unwrap_or_default()),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from_json).collect())
            }
            serde_json::Value::Object(map) => Self::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Self::from_json(v)))
                    .collect(),
            ),
        }
    }
}

/// Find the default export of a config module and parse it.
///
/// Accepts `export default <value>` and `module.exports = <value>`. If the exported
/// value is a bare identifier, the matching `const`/`let`/`var` declaration is parsed
/// instead.
pub(crate) fn parse_default_export(source: &str) -> Result<Literal, String> {
    let stripped = strip_comments(source);

    let start = export_position(&stripped)
        .ok_or_else(|| "No `export default` or `module.exports =` found".to_string())?;
    let value = parse_at(&stripped, start)?;

    match value {
        Literal::Ident(name) => {
            let decl = declaration_position(&stripped, &name)
                .ok_or_else(|| format!("Exported binding `{name}` is not declared in the file"))?;
            parse_at(&stripped, decl)
        }
        other => Ok(other),
    }
}

fn export_position(source: &str) -> Option<usize> {
    if let Some(idx) = find_code(source, "export default", 0) {
        return Some(idx + "export default".len());
    }
    let idx = find_code(source, "module.exports", 0)?;
    let after = &source[idx + "module.exports".len()..];
    let eq = after.find('=')?;
    if after[..eq].trim().is_empty() {
        Some(idx + "module.exports".len() + eq + 1)
    } else {
        None
    }
}

fn declaration_position(source: &str, name: &str) -> Option<usize> {
    for keyword in ["const", "let", "var"] {
        let needle = format!("{keyword} {name}");
        let mut from = 0;
        while let Some(idx) = find_code(source, &needle, from) {
            let end = idx + needle.len();
            let after = source[end..].trim_start();
            if let Some(rest) = after.strip_prefix('=') {
                if !rest.starts_with('=') {
                    return Some(source.len() - rest.len());
                }
            }
            from = end;
        }
    }
    None
}

/// Byte offset of the first `needle` at or after `from` that is not inside a string.
fn find_code(source: &str, needle: &str, from: usize) -> Option<usize> {
    let mut in_string: Option<char> = None;
    let mut escaped = false;

    for (idx, ch) in source.char_indices() {
        if let Some(quote) = in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == quote {
                in_string = None;
            }
            continue;
        }
        if idx >= from && source[idx..].starts_with(needle) {
            return Some(idx);
        }
        if matches!(ch, '"' | '\'' | '`') {
            in_string = Some(ch);
        }
    }
    None
}

/// Parse a single literal starting at byte offset `start`.
fn parse_at(source: &str, start: usize) -> Result<Literal, String> {
    let mut parser = LiteralParser::new(&source[start..]);
    parser.parse_value()
}

/// Strip single-line (`//`) and multi-line (`/* */`) comments, leaving strings intact.
pub(crate) fn strip_comments(source: &str) -> String {
    let mut result = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut in_string: Option<char> = None;
    let mut escaped = false;

    while let Some(ch) = chars.next() {
        if let Some(quote) = in_string {
            result.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == quote {
                in_string = None;
            }
            continue;
        }

        match (ch, chars.peek().copied()) {
            ('/', Some('/')) => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        result.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    if c == '\n' {
                        result.push('\n');
                    }
                    prev = c;
                }
            }
            _ => {
                if matches!(ch, '"' | '\'' | '`') {
                    in_string = Some(ch);
                }
                result.push(ch);
            }
        }
    }

    result
}

struct LiteralParser {
    chars: Vec<char>,
    pos: usize,
}

impl LiteralParser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn parse_value(&mut self) -> Result<Literal, String> {
        self.skip_whitespace();
        match self.peek() {
            Some('{') => self.parse_object(),
            Some('[') => self.parse_array(),
            Some('"' | '\'' | '`') => self.parse_string().map(Literal::String),
            Some(ch) if ch == '-' || ch.is_ascii_digit() => self.parse_number(),
            Some(ch) if is_ident_start(ch) => self.parse_identifier_expression(),
            Some(ch) => Err(format!(
                "Unexpected character '{ch}' at position {}",
                self.pos
            )),
            None => Err("Unexpected end of input".to_string()),
        }
    }

    /// Comma-separated values up to `close`, allowing a trailing comma.
    fn parse_list(&mut self, close: char, what: &str) -> Result<Vec<Literal>, String> {
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(ch) if ch == close => {
                    self.advance();
                    return Ok(items);
                }
                None => return Err(format!("Unterminated {what}")),
                _ => {}
            }

            items.push(self.parse_value()?);

            self.skip_whitespace();
            match self.peek() {
                Some(',') => {
                    self.advance();
                }
                Some(ch) if ch == close => {}
                None => return Err(format!("Unterminated {what}")),
                Some(ch) => {
                    return Err(format!("Expected ',' or '{close}' in {what}, got '{ch}'"));
                }
            }
        }
    }

    fn parse_object(&mut self) -> Result<Literal, String> {
        self.advance(); // '{'
        let mut entries = Vec::new();

        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('}') => {
                    self.advance();
                    return Ok(Literal::Object(entries));
                }
                None => return Err("Unterminated object".to_string()),
                _ => {}
            }

            let key = self.parse_key()?;
            self.skip_whitespace();
            let value = match self.peek() {
                Some(':') => {
                    self.advance();
                    self.parse_value()?
                }
                // Shorthand property: `{ svelte }`
                Some(',' | '}') => Literal::Ident(key.clone()),
                other => return Err(format!("Expected ':' after key `{key}`, got {other:?}")),
            };
            entries.push((key, value));

            self.skip_whitespace();
            match self.peek() {
                Some(',') => {
                    self.advance();
                }
                Some('}') => {}
                None => return Err("Unterminated object".to_string()),
                Some(ch) => return Err(format!("Expected ',' or '}}' in object, got '{ch}'")),
            }
        }
    }

    fn parse_array(&mut self) -> Result<Literal, String> {
        self.advance(); // '['
        self.parse_list(']', "array").map(Literal::Array)
    }

    fn parse_key(&mut self) -> Result<String, String> {
        self.skip_whitespace();
        match self.peek() {
            Some('"' | '\'' | '`') => self.parse_string(),
            Some(ch) if is_ident_start(ch) => Ok(self.take_while(is_ident_char)),
            Some(ch) if ch.is_ascii_digit() => Ok(self.take_while(|c| c.is_ascii_digit())),
            other => Err(format!("Expected object key, got {other:?}")),
        }
    }

    fn parse_string(&mut self) -> Result<String, String> {
        let Some(quote) = self.advance() else {
            return Err("Expected string".to_string());
        };
        let mut s = String::new();

        loop {
            match self.advance() {
                Some(ch) if ch == quote => return Ok(s),
                Some('$') if quote == '`' && self.peek() == Some('{') => {
                    return Err("Template literal interpolation is not supported".to_string());
                }
                Some('\\') => match self.advance() {
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some('r') => s.push('\r'),
                    Some('\\') => s.push('\\'),
                    Some(ch) if ch == quote => s.push(ch),
                    Some(ch) => {
                        s.push('\\');
                        s.push(ch);
                    }
                    None => return Err("Unterminated string escape".to_string()),
                },
                Some(ch) => s.push(ch),
                None => return Err("Unterminated string".to_string()),
            }
        }
    }

    fn parse_number(&mut self) -> Result<Literal, String> {
        let mut num = String::new();
        if self.peek() == Some('-') {
            num.push('-');
            self.advance();
        }
        num.push_str(&self.take_while(|c| c.is_ascii_digit() || c == '.'));

        num.parse::<f64>()
            .map(Literal::Number)
            .map_err(|e| format!("Invalid number '{num}': {e}"))
    }

    /// Identifier, keyword, member path, call or `new` expression.
    fn parse_identifier_expression(&mut self) -> Result<Literal, String> {
        let name = self.take_while(|c| is_ident_char(c) || c == '.');

        match name.as_str() {
            "true" => return Ok(Literal::Bool(true)),
            "false" => return Ok(Literal::Bool(false)),
            "null" | "undefined" => return Ok(Literal::Null),
            "new" => {
                return match self.parse_value()? {
                    Literal::Call { callee, args } => Ok(Literal::Call {
                        callee: format!("new {callee}"),
                        args,
                    }),
                    Literal::Ident(callee) => Ok(Literal::Call {
                        callee: format!("new {callee}"),
                        args: Vec::new(),
                    }),
                    other => Err(format!("Cannot construct a {}", other.kind())),
                };
            }
            _ => {}
        }

        self.skip_whitespace();
        if self.peek() == Some('(') {
            self.advance();
            let args = self.parse_list(')', "argument list")?;
            return Ok(Literal::Call { callee: name, args });
        }
        if self.peek() == Some('=') && self.chars.get(self.pos + 1) == Some(&'>') {
            return Err("Function-form configs are not supported; export an object".to_string());
        }

        Ok(Literal::Ident(name))
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            out.push(ch);
            self.pos += 1;
        }
        out
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(entries: Vec<(&str, Literal)>) -> Literal {
        Literal::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    #[test]
    fn test_define_config_wrapper() {
        let source = r#"
            import { defineConfig } from 'vite'
            import { svelte } from '@sveltejs/vite-plugin-svelte'
            import path from 'path'

            // https://vitejs.dev/config/
            export default defineConfig({
              base: '/hdx-signals-inform/',
              plugins: [
                svelte()
              ],
              resolve: {
                alias: {
                  "pages": path.resolve("./src/pages")
                }
              }
            })
        "#;

        let value = parse_default_export(source).unwrap();
        let Literal::Call { callee, args } = value else {
            panic!("expected call expression");
        };
        assert_eq!(callee, "defineConfig");
        let config = &args[0];

        assert_eq!(
            config.get("base"),
            Some(&Literal::String("/hdx-signals-inform/".to_string()))
        );
        assert_eq!(
            config.get("plugins"),
            Some(&Literal::Array(vec![Literal::Call {
                callee: "svelte".to_string(),
                args: vec![],
            }]))
        );
        let alias = config.get("resolve").and_then(|r| r.get("alias")).unwrap();
        assert_eq!(
            alias,
            &obj(vec![(
                "pages",
                Literal::Call {
                    callee: "path.resolve".to_string(),
                    args: vec![Literal::String("./src/pages".to_string())],
                }
            )])
        );
    }

    #[test]
    fn test_object_keeps_source_order() {
        let value = parse_default_export("export default { z: 1, a: 2, m: 3 };").unwrap();
        let Literal::Object(entries) = value else {
            panic!("expected object");
        };
        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_exported_binding() {
        let source = r"
            const config = { base: '/app/' };
            export default config;
        ";
        let value = parse_default_export(source).unwrap();
        assert_eq!(value.get("base"), Some(&Literal::String("/app/".to_string())));
    }

    #[test]
    fn test_module_exports() {
        let value = parse_default_export("module.exports = { base: './' }").unwrap();
        assert_eq!(value.get("base"), Some(&Literal::String("./".to_string())));
    }

    #[test]
    fn test_new_expression() {
        let value =
            parse_default_export("export default fileURLToPath(new URL('./src', import.meta.url))")
                .unwrap();
        assert_eq!(
            value,
            Literal::Call {
                callee: "fileURLToPath".to_string(),
                args: vec![Literal::Call {
                    callee: "new URL".to_string(),
                    args: vec![
                        Literal::String("./src".to_string()),
                        Literal::Ident("import.meta.url".to_string()),
                    ],
                }],
            }
        );
    }

    #[test]
    fn test_comments_inside_strings_survive() {
        let source = "export default { url: 'https://example.com/*x*/' } // trailing";
        let value = parse_default_export(source).unwrap();
        assert_eq!(
            value.get("url"),
            Some(&Literal::String("https://example.com/*x*/".to_string()))
        );
    }

    #[test]
    fn test_shorthand_property_and_trailing_commas() {
        let value = parse_default_export("export default { svelte, list: [1, 2,], }").unwrap();
        assert_eq!(
            value.get("svelte"),
            Some(&Literal::Ident("svelte".to_string()))
        );
        assert_eq!(
            value.get("list"),
            Some(&Literal::Array(vec![Literal::Number(1.0), Literal::Number(2.0)]))
        );
    }

    #[test]
    fn test_function_form_rejected() {
        let err = parse_default_export("export default defineConfig(({ mode }) => ({}))");
        assert!(err.is_err());
        let err = parse_default_export("export default mode => ({})").unwrap_err();
        assert!(err.contains("Function-form"));
    }

    #[test]
    fn test_template_interpolation_rejected() {
        let err = parse_default_export("export default { base: `/${name}/` }").unwrap_err();
        assert!(err.contains("interpolation"));
    }

    #[test]
    fn test_export_phrase_inside_string_ignored() {
        let source = r#"
            const banner = "export default";
            const config = { base: '/app/', note: 'const config = 1' };
            export default config;
        "#;
        let value = parse_default_export(source).unwrap();
        assert_eq!(value.get("base"), Some(&Literal::String("/app/".to_string())));
    }

    #[test]
    fn test_missing_export() {
        assert!(parse_default_export("const config = {};").is_err());
    }

    #[test]
    fn test_from_json_keeps_order() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"b": "x", "a": [true, null]}"#).unwrap();
        assert_eq!(
            Literal::from_json(json),
            obj(vec![
                ("b", Literal::String("x".to_string())),
                ("a", Literal::Array(vec![Literal::Bool(true), Literal::Null])),
            ])
        );
    }

    #[test]
    fn test_strip_comments() {
        let input = "
            // line comment
            hello /* block
            comment */ world
        ";
        let result = strip_comments(input);
        assert!(!result.contains("line comment"));
        assert!(!result.contains("block"));
        assert!(result.contains("hello"));
        assert!(result.contains("world"));
    }
}
