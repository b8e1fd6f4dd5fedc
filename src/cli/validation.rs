use crate::cli::args::CliArgs;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(size) = args.page_size {
        if size == 0 {
            return Err("invalid page-size, expected positive integer".to_string());
        }
    }
    if let Some(raw) = args.output_format.as_deref() {
        crate::output::OutputFormat::parse(raw)
            .ok_or_else(|| format!("invalid --output-format '{raw}', expected text, json or html"))?;
    }
    if let Some(raw) = args.problem_pattern.as_deref() {
        crate::render::ProblemPattern::new(raw)
            .map_err(|e| format!("invalid --problem-pattern '{raw}': {e}"))?;
    }
    if let Some(group_by) = args.group_by.as_deref() {
        if group_by.trim().is_empty() {
            return Err("invalid group-by, expected a column name".to_string());
        }
    }
    Ok(())
}
