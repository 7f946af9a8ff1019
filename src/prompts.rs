pub const TERM_EXPANSION: &str = include_str!("../data/prompts/term_expansion.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

/// Build the classification + expansion prompt for raw learner input.
pub fn term_expansion(input: &str) -> String {
    render(TERM_EXPANSION, &[("input", input)])
}
