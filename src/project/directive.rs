//! Line grammar of project files.

use regex::Regex;

/// One meaningful line of a project file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive<'a> {
    /// `+<pattern>`
    Add(&'a str),
    /// `-<pattern>`
    Remove(&'a str),
    /// `name <value>`
    Name(&'a str),
    /// `require <path> [include_dir=<path>]`
    Require {
        path: &'a str,
        include_dir: Option<&'a str>,
    },
    /// `c++ <standard>` / `cpp <standard>`
    Standard(&'a str),
    /// `arg <flag>`
    Arg(&'a str),
    /// `linker_arg <flag>`
    LinkerArg(&'a str),
    /// `compiler <program>`
    Compiler(&'a str),
    Static,
    /// `dynamic` or `shared`
    Dynamic,
    /// `if [not ]<condition>`, condition already lowercased
    If { negated: bool, condition: String },
    EndIf,
    Unknown(&'a str),
}

impl<'a> Directive<'a> {
    /// Parse one raw line. Leading whitespace and a trailing carriage return
    /// are dropped; blank lines yield `None`.
    pub fn parse(raw: &'a str) -> Option<Self> {
        let line = raw.trim_start();
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            return None;
        }

        if let Some(pattern) = line.strip_prefix('+') {
            return Some(Directive::Add(pattern));
        }
        if let Some(pattern) = line.strip_prefix('-') {
            return Some(Directive::Remove(pattern));
        }

        let directive = match line {
            "endif" => Directive::EndIf,
            "static" => Directive::Static,
            "dynamic" | "shared" => Directive::Dynamic,
            _ => {
                if let Some(value) = line.strip_prefix("name ") {
                    Directive::Name(value)
                } else if let Some(rest) = line.strip_prefix("require ") {
                    match rest.split_once(" include_dir=") {
                        Some((path, include_dir)) => Directive::Require {
                            path,
                            include_dir: Some(include_dir),
                        },
                        None => Directive::Require {
                            path: rest,
                            include_dir: None,
                        },
                    }
                } else if let Some(value) = line
                    .strip_prefix("c++ ")
                    .or_else(|| line.strip_prefix("cpp "))
                {
                    Directive::Standard(value)
                } else if let Some(value) = line.strip_prefix("arg ") {
                    Directive::Arg(value)
                } else if let Some(value) = line.strip_prefix("linker_arg ") {
                    Directive::LinkerArg(value)
                } else if let Some(value) = line.strip_prefix("compiler ") {
                    Directive::Compiler(value)
                } else if let Some(cond) = line.strip_prefix("if ") {
                    let cond = cond.to_lowercase();
                    match cond.strip_prefix("not ") {
                        Some(inner) => Directive::If {
                            negated: true,
                            condition: inner.to_string(),
                        },
                        None => Directive::If {
                            negated: false,
                            condition: cond,
                        },
                    }
                } else {
                    Directive::Unknown(line)
                }
            }
        };
        Some(directive)
    }
}

/// State of the single-level conditional block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Block {
    #[default]
    Outside,
    Taken,
    Skipped,
}

impl Block {
    pub fn is_open(self) -> bool {
        self != Block::Outside
    }

    pub fn skipping(self) -> bool {
        self == Block::Skipped
    }
}

/// Whether a pattern needs a directory scan rather than being a literal path
pub fn is_wildcard(pattern: &str) -> bool {
    pattern.contains('*')
}

/// Compile a `*` pattern into an anchored regex. Each `*` stands for one or
/// more characters; everything else is literal.
pub fn compile_wildcard(pattern: &str) -> Result<Regex, regex::Error> {
    let parts: Vec<String> = pattern.split('*').map(regex::escape).collect();
    Regex::new(&format!("^{}$", parts.join(".+")))
}

pub fn wildcard_match(pattern: &str, name: &str) -> bool {
    compile_wildcard(pattern)
        .map(|re| re.is_match(name))
        .unwrap_or(false)
}
