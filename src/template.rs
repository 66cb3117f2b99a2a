//! Placeholder substitution for welcome titles and messages.
//!
//! Recognised placeholders are `{member_name}` and `{guild_name}`. `{{` and `}}`
//! render as literal braces. Anything else in braces, and any unmatched brace,
//! is copied through untouched, so a template typed by an admin can never make
//! rendering fail.

/// Values substituted into a welcome template
#[derive(Debug, Clone, Copy)]
pub struct TemplateVars<'a> {
    pub member_name: &'a str,
    pub guild_name: &'a str,
}

impl<'a> TemplateVars<'a> {
    pub fn new(member_name: &'a str, guild_name: &'a str) -> Self {
        TemplateVars {
            member_name,
            guild_name,
        }
    }

    fn lookup(&self, name: &str) -> Option<&'a str> {
        match name {
            "member_name" => Some(self.member_name),
            "guild_name" => Some(self.guild_name),
            _ => None,
        }
    }
}

pub fn render(template: &str, vars: &TemplateVars<'_>) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(|c: char| c == '{' || c == '}') {
        output.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") || tail.starts_with("}}") {
            output.push_str(&tail[..1]);
            rest = &tail[2..];
            continue;
        }

        if tail.starts_with('{') {
            if let Some(end) = tail.find('}') {
                if let Some(value) = vars.lookup(&tail[1..end]) {
                    output.push_str(value);
                    rest = &tail[end + 1..];
                    continue;
                }
            }
        }

        // Unknown placeholder or stray brace
        output.push_str(&tail[..1]);
        rest = &tail[1..];
    }

    output.push_str(rest);
    output
}
