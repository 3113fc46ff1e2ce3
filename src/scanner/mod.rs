//! Static discovery of namespace and type declarations in PHP source.
//!
//! Nothing is executed or loaded: the source is tokenized and a single pass
//! tracks the namespace in effect while collecting every type declared with
//! `class`, `interface`, `trait` or `enum`.
//!
//! Namespace scoping is positional: a `namespace Foo;` statement applies to
//! everything after it until the next namespace statement. The braced form
//! `namespace Foo { ... }` additionally ends at its closing brace, after
//! which declarations fall back to the global namespace.

mod lexer;

pub use lexer::{Lexer, Token, TokenKind};

use serde::Serialize;

/// Separator between namespace segments.
pub const NAMESPACE_SEPARATOR: char = '\\';

/// Kind of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    Class,
    Interface,
    Trait,
    Enum,
}

impl DeclarationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclarationKind::Class => "class",
            DeclarationKind::Interface => "interface",
            DeclarationKind::Trait => "trait",
            DeclarationKind::Enum => "enum",
        }
    }
}

impl std::fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Keywords that declare a type when directly followed by its name.
static DECLARATION_KEYWORDS: phf::Map<&'static str, DeclarationKind> = phf::phf_map! {
    "class" => DeclarationKind::Class,
    "interface" => DeclarationKind::Interface,
    "trait" => DeclarationKind::Trait,
    "enum" => DeclarationKind::Enum,
};

/// Tokens after which a declaration keyword is a reference, not a declaration
/// (`Foo::class`, `new class {}`, `function class()`, `const CLASS`).
static NON_DECLARING_PREDECESSORS: phf::Set<&'static str> = phf::phf_set! {
    "new",
    "function",
    "const",
};

/// A type declared in a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    /// Fully-qualified name (`App\Model\User`, or `User` at global scope).
    pub name: String,
    /// Namespace in effect at the declaration, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub kind: DeclarationKind,
    /// Line number (1-indexed)
    pub line: usize,
}

impl Declaration {
    /// The unqualified type name.
    pub fn short_name(&self) -> &str {
        self.name
            .rsplit(NAMESPACE_SEPARATOR)
            .next()
            .unwrap_or(&self.name)
    }
}

/// Everything discovered in one source text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// Declared namespaces, in file order. Redeclarations are kept.
    pub namespaces: Vec<String>,
    /// Declared types, in file order.
    pub declarations: Vec<Declaration>,
}

impl ScanResult {
    /// Fully-qualified names of all declared types.
    pub fn classes(&self) -> Vec<String> {
        self.declarations.iter().map(|d| d.name.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

/// Scan PHP source text for namespace and type declarations.
pub fn scan(source: &str) -> ScanResult {
    let tokens: Vec<Token> = Lexer::new(source).collect();
    let mut result = ScanResult::default();

    let mut current: Option<String> = None;
    let mut depth = 0usize;
    // Brace depth outside the currently open braced namespace block.
    let mut braced_namespace: Option<usize> = None;

    for (i, tok) in tokens.iter().enumerate() {
        match tok.kind {
            TokenKind::OpenBrace => depth += 1,
            TokenKind::CloseBrace => {
                depth = depth.saturating_sub(1);
                if braced_namespace == Some(depth) {
                    braced_namespace = None;
                    current = None;
                }
            }
            TokenKind::Name if tok.is_keyword("namespace") => {
                if is_member_access(i.checked_sub(1).map(|p| &tokens[p])) {
                    continue;
                }
                match tokens.get(i + 1) {
                    Some(name) if name.kind == TokenKind::Name && is_qualified_name(name.text) => {
                        result.namespaces.push(name.text.to_string());
                        current = Some(name.text.to_string());
                        if tokens.get(i + 2).map(|t| t.kind) == Some(TokenKind::OpenBrace) {
                            braced_namespace = Some(depth);
                        }
                    }
                    Some(brace) if brace.kind == TokenKind::OpenBrace => {
                        current = None;
                        braced_namespace = Some(depth);
                    }
                    _ => {}
                }
            }
            TokenKind::Name => {
                if let Some(kind) = declaration_at(&tokens, i) {
                    let short = tokens[i + 1].text;
                    let name = match &current {
                        Some(ns) => format!("{}{}{}", ns, NAMESPACE_SEPARATOR, short),
                        None => short.to_string(),
                    };
                    result.declarations.push(Declaration {
                        name,
                        namespace: current.clone(),
                        kind,
                        line: tok.line,
                    });
                }
            }
            _ => {}
        }
    }

    result
}

/// If `tokens[i]` opens a type declaration, return its kind.
fn declaration_at(tokens: &[Token], i: usize) -> Option<DeclarationKind> {
    let keyword = tokens[i].text;
    if keyword.len() > "interface".len() {
        return None;
    }
    let kind = *DECLARATION_KEYWORDS.get(keyword.to_ascii_lowercase().as_str())?;

    let prev = i.checked_sub(1).map(|p| &tokens[p]);
    if is_member_access(prev) {
        return None;
    }
    if let Some(prev) = prev {
        if prev.kind == TokenKind::Name
            && NON_DECLARING_PREDECESSORS.contains(prev.text.to_ascii_lowercase().as_str())
        {
            return None;
        }
    }

    let name = tokens.get(i + 1)?;
    if name.kind != TokenKind::Name
        || name.text.contains(NAMESPACE_SEPARATOR)
        || name.is_keyword("extends")
        || name.is_keyword("implements")
    {
        return None;
    }

    // `enum` is a soft keyword; only `enum Name {`, `enum Name: type` and
    // `enum Name implements` declare one.
    if kind == DeclarationKind::Enum {
        let follower = tokens.get(i + 2)?;
        let declares = matches!(follower.kind, TokenKind::OpenBrace | TokenKind::Colon)
            || follower.is_keyword("implements");
        if !declares {
            return None;
        }
    }

    Some(kind)
}

fn is_member_access(tok: Option<&Token>) -> bool {
    matches!(
        tok.map(|t| t.kind),
        Some(TokenKind::DoubleColon | TokenKind::ObjectOperator)
    )
}

/// Whether `name` is a non-empty, relative qualified identifier (`A`, `A\B`).
pub fn is_qualified_name(name: &str) -> bool {
    !name.is_empty()
        && name.split(NAMESPACE_SEPARATOR).all(|segment| {
            let mut bytes = segment.bytes();
            match bytes.next() {
                Some(first) if first.is_ascii_alphabetic() || first == b'_' || first >= 0x80 => {
                    bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80)
                }
                _ => false,
            }
        })
}
