use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "reconcile-report",
    version,
    about = "grouped, paginated reconciliation report viewer",
    long_about = "reconcile-report loads reconciliation report data (reconciled, explanation and unreconciled rows per subject), replays view events such as paging, filtering and opening groups, and writes the resulting view.\n\nExamples:\n  reconcile-report -d summary.json\n  reconcile-report -d summary.json -f 'Show All Problems' --page 3 -o page.html\n  reconcile-report -d summary.json -e events.yml --output-format json\n\nTip: Use --config to persist report settings and keep CLI invocations short."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "vb",
        visible_alias = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'c',
        long = "clr",
        visible_alias = "color",
        help_heading = "Output",
        help = "Enable colored output (overrides --no-color)."
    )]
    pub color: bool,

    #[arg(
        long = "nc",
        visible_alias = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'o',
        long = "out",
        visible_alias = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write the view to FILE instead of stdout."
    )]
    pub output: Option<String>,

    #[arg(
        long = "of",
        visible_alias = "output-format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output format: text, json or html (default: inferred from --output, else text)."
    )]
    pub output_format: Option<String>,

    #[arg(
        long = "title",
        value_name = "TEXT",
        help_heading = "Output",
        help = "Report title used in the written view."
    )]
    pub title: Option<String>,

    #[arg(
        short = 'd',
        long = "data",
        value_name = "FILE",
        help_heading = "Input",
        help = "Report data as JSON (filters, groups, columns, args)."
    )]
    pub data: Option<String>,

    #[arg(
        short = 'e',
        long = "ev",
        visible_alias = "events",
        value_name = "FILE",
        help_heading = "Input",
        help = "Replay view events from a YAML or JSON list before writing."
    )]
    pub events: Option<String>,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.reconcile-report/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "init-config",
        help_heading = "Input",
        help = "Write a commented default config file and exit."
    )]
    pub init_config: bool,

    #[arg(
        short = 's',
        long = "ps",
        visible_alias = "page-size",
        value_name = "N",
        help_heading = "Report",
        help = "Groups per page (overrides the data's page_size)."
    )]
    pub page_size: Option<usize>,

    #[arg(
        long = "gb",
        visible_alias = "group-by",
        value_name = "COLUMN",
        help_heading = "Report",
        help = "Column identifying the subject."
    )]
    pub group_by: Option<String>,

    #[arg(
        long = "kc",
        visible_alias = "key-column",
        value_name = "COLUMN",
        help_heading = "Report",
        help = "Secondary identity column of unreconciled rows."
    )]
    pub key_column: Option<String>,

    #[arg(
        short = 'p',
        long = "pp",
        visible_alias = "problem-pattern",
        value_name = "REGEX",
        help_heading = "Report",
        help = "Case-insensitive regex marking explanation text as a problem."
    )]
    pub problem_pattern: Option<String>,

    #[arg(
        long = "pf",
        visible_alias = "problem-filters",
        num_args = 0..=1,
        default_missing_value = "true",
        help_heading = "Report",
        help = "Add one 'Problems: <column>' filter per column with problems."
    )]
    pub problem_filters: Option<bool>,

    #[arg(
        long = "lf",
        visible_alias = "list-filters",
        help_heading = "Report",
        help = "Print the filters with their group counts and exit."
    )]
    pub list_filters: bool,

    #[arg(
        short = 'f',
        long = "fl",
        visible_alias = "filter",
        value_name = "NAME",
        help_heading = "View",
        help = "Initial filter (default: Show All)."
    )]
    pub filter: Option<String>,

    #[arg(
        long = "pg",
        visible_alias = "page",
        value_name = "N",
        allow_negative_numbers = true,
        help_heading = "View",
        help = "Initial page; out-of-range values are clamped."
    )]
    pub page: Option<i64>,

    #[arg(
        long = "open",
        value_name = "IDS",
        action = ArgAction::Append,
        help_heading = "View",
        help = "Open these groups (comma-separated, repeatable)."
    )]
    pub open: Vec<String>,

    #[arg(
        long = "open-all",
        help_heading = "View",
        help = "Start with every group open."
    )]
    pub open_all: bool,
}
