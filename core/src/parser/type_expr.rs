//! # Type Expressions
//!
//! A small tree for Go type expressions plus a recursive-descent parser over
//! their source text. Only the shapes schema generation cares about are
//! modelled; everything else (funcs, channels, inline interfaces and structs)
//! is kept as opaque text.

use crate::error::{AppError, AppResult};
use std::collections::HashMap;
use std::fmt::{self, Display};
use std::str::FromStr;

/// A Go type expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    /// A (possibly qualified, possibly instantiated) named type.
    Named {
        /// Package qualifier (`time` in `time.Time`).
        package: Option<String>,
        /// Bare identifier.
        name: String,
        /// Type arguments of a generic instantiation.
        args: Vec<TypeExpr>,
    },
    /// `*T`
    Pointer(Box<TypeExpr>),
    /// `[]T` and `[N]T`
    Slice(Box<TypeExpr>),
    /// `map[K]V`
    Map(Box<TypeExpr>, Box<TypeExpr>),
    /// Anything not modelled above, verbatim.
    Opaque(String),
}

impl TypeExpr {
    /// An unqualified, non-generic named type.
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named {
            package: None,
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Wraps `self` in a pointer.
    pub fn pointer(self) -> Self {
        TypeExpr::Pointer(Box::new(self))
    }

    /// Wraps `self` in a slice.
    pub fn slice(self) -> Self {
        TypeExpr::Slice(Box::new(self))
    }

    /// Whether the outermost layer is a pointer.
    pub fn is_pointer(&self) -> bool {
        matches!(self, TypeExpr::Pointer(_))
    }

    /// Removes every outer pointer layer.
    pub fn strip_pointers(&self) -> &TypeExpr {
        let mut current = self;
        while let TypeExpr::Pointer(inner) = current {
            current = inner;
        }
        current
    }

    /// The bare identifier when the pointer-stripped type is named.
    pub fn base_name(&self) -> Option<&str> {
        match self.strip_pointers() {
            TypeExpr::Named { name, .. } => Some(name),
            _ => None,
        }
    }

    /// The package qualifier when the pointer-stripped type is named.
    pub fn qualifier(&self) -> Option<&str> {
        match self.strip_pointers() {
            TypeExpr::Named { package, .. } => package.as_deref(),
            _ => None,
        }
    }

    /// Type arguments when the pointer-stripped type is an instantiation.
    pub fn type_args(&self) -> &[TypeExpr] {
        match self.strip_pointers() {
            TypeExpr::Named { args, .. } => args,
            _ => &[],
        }
    }

    /// Whether the pointer-stripped type carries type arguments.
    pub fn is_instantiation(&self) -> bool {
        !self.type_args().is_empty()
    }

    /// Collects every named type reachable inside the expression, outermost
    /// first, including type arguments and map keys/values.
    pub fn named_refs(&self) -> Vec<&TypeExpr> {
        let mut out = Vec::new();
        self.collect_named(&mut out);
        out
    }

    fn collect_named<'a>(&'a self, out: &mut Vec<&'a TypeExpr>) {
        match self {
            TypeExpr::Named { args, .. } => {
                out.push(self);
                for arg in args {
                    arg.collect_named(out);
                }
            }
            TypeExpr::Pointer(inner) | TypeExpr::Slice(inner) => inner.collect_named(out),
            TypeExpr::Map(key, value) => {
                key.collect_named(out);
                value.collect_named(out);
            }
            TypeExpr::Opaque(_) => {}
        }
    }

    /// Replaces unqualified, argument-free names found in `bindings`.
    pub fn substitute(&self, bindings: &HashMap<String, TypeExpr>) -> TypeExpr {
        match self {
            TypeExpr::Named {
                package: None,
                name,
                args,
            } if args.is_empty() => match bindings.get(name) {
                Some(bound) => bound.clone(),
                None => self.clone(),
            },
            TypeExpr::Named {
                package,
                name,
                args,
            } => TypeExpr::Named {
                package: package.clone(),
                name: name.clone(),
                args: args.iter().map(|a| a.substitute(bindings)).collect(),
            },
            TypeExpr::Pointer(inner) => TypeExpr::Pointer(Box::new(inner.substitute(bindings))),
            TypeExpr::Slice(inner) => TypeExpr::Slice(Box::new(inner.substitute(bindings))),
            TypeExpr::Map(key, value) => TypeExpr::Map(
                Box::new(key.substitute(bindings)),
                Box::new(value.substitute(bindings)),
            ),
            TypeExpr::Opaque(_) => self.clone(),
        }
    }

    /// Whether any unqualified, argument-free name in `params` occurs.
    pub fn mentions_any(&self, params: &[String]) -> bool {
        self.named_refs().into_iter().any(|t| match t {
            TypeExpr::Named {
                package: None,
                name,
                args,
            } => args.is_empty() && params.contains(name),
            _ => false,
        })
    }
}

impl Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Named {
                package,
                name,
                args,
            } => {
                if let Some(pkg) = package {
                    write!(f, "{}.", pkg)?;
                }
                write!(f, "{}", name)?;
                if !args.is_empty() {
                    write!(f, "[")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    write!(f, "]")?;
                }
                Ok(())
            }
            TypeExpr::Pointer(inner) => write!(f, "*{}", inner),
            TypeExpr::Slice(inner) => write!(f, "[]{}", inner),
            TypeExpr::Map(key, value) => write!(f, "map[{}]{}", key, value),
            TypeExpr::Opaque(text) => write!(f, "{}", text),
        }
    }
}

impl FromStr for TypeExpr {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        let mut cursor = Cursor::new(s);
        let ty = cursor.parse_type()?;
        cursor.skip_ws();
        if !cursor.at_end() {
            return Err(AppError::General(format!(
                "Unexpected trailing input in type '{}'",
                s
            )));
        }
        Ok(ty)
    }
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn eat(&mut self, c: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> AppResult<()> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(AppError::General(format!(
                "Expected '{}' at offset {} in type '{}'",
                c, self.pos, self.src
            )))
        }
    }

    fn ident(&mut self) -> Option<&'a str> {
        self.skip_ws();
        let rest = self.rest();
        let len: usize = rest
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .map(char::len_utf8)
            .sum();
        if len == 0 {
            return None;
        }
        self.pos += len;
        Some(&rest[..len])
    }

    /// Consumes up to (not including) the next `,` or unbalanced closing
    /// bracket at nesting depth zero.
    fn opaque_until_boundary(&mut self, start: usize) -> TypeExpr {
        let mut depth = 0i32;
        while let Some(c) = self.peek() {
            match c {
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                ',' if depth == 0 => break,
                _ => {}
            }
            self.pos += c.len_utf8();
        }
        TypeExpr::Opaque(self.src[start..self.pos].trim().to_string())
    }

    fn parse_type(&mut self) -> AppResult<TypeExpr> {
        self.skip_ws();
        let start = self.pos;
        match self.peek() {
            Some('*') => {
                self.pos += 1;
                Ok(TypeExpr::Pointer(Box::new(self.parse_type()?)))
            }
            Some('(') => {
                self.pos += 1;
                let inner = self.parse_type()?;
                self.expect(')')?;
                Ok(inner)
            }
            Some('[') => {
                self.pos += 1;
                // `[]T`, `[N]T` and `[...]T` all become lists.
                while let Some(c) = self.peek() {
                    self.pos += c.len_utf8();
                    if c == ']' {
                        return Ok(TypeExpr::Slice(Box::new(self.parse_type()?)));
                    }
                }
                Err(AppError::General(format!(
                    "Unterminated array type '{}'",
                    self.src
                )))
            }
            // `<-chan T`
            Some('<') => Ok(self.opaque_until_boundary(start)),
            Some(_) => {
                let ident = self.ident().ok_or_else(|| {
                    AppError::General(format!("Expected a type in '{}'", self.src))
                })?;
                match ident {
                    "map" => {
                        self.expect('[')?;
                        let key = self.parse_type()?;
                        self.expect(']')?;
                        let value = self.parse_type()?;
                        Ok(TypeExpr::Map(Box::new(key), Box::new(value)))
                    }
                    "interface" | "struct" | "func" | "chan" => {
                        Ok(self.opaque_until_boundary(start))
                    }
                    _ => self.parse_named(ident),
                }
            }
            None => Err(AppError::General(format!(
                "Empty type expression in '{}'",
                self.src
            ))),
        }
    }

    fn parse_named(&mut self, first: &str) -> AppResult<TypeExpr> {
        let (package, name) = if self.eat('.') {
            let name = self.ident().ok_or_else(|| {
                AppError::General(format!("Expected identifier after '.' in '{}'", self.src))
            })?;
            (Some(first.to_string()), name.to_string())
        } else {
            (None, first.to_string())
        };

        let mut args = Vec::new();
        if self.eat('[') {
            loop {
                args.push(self.parse_type()?);
                if self.eat(',') {
                    // trailing comma before `]`
                    if self.eat(']') {
                        break;
                    }
                    continue;
                }
                self.expect(']')?;
                break;
            }
        }

        Ok(TypeExpr::Named {
            package,
            name,
            args,
        })
    }
}
