use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "rosterview",
    version,
    about = "serve a JSON student roster as a searchable HTML table",
    long_about = "rosterview reads a JSON array of student records and serves it as a searchable HTML table with a print-ready export view.\n\nExamples:\n  rosterview -d ./data.json\n  rosterview -d ./data.json -b 0.0.0.0:8080 --title \"Group IS-235.1\"\n  rosterview -d ./data.json -o report.html --search ivan --export\n\nTip: Use --config to persist settings and keep CLI invocations short."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "vb",
        visible_alias = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv)."
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
        short = 'n',
        long = "nc",
        visible_alias = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        long = "lj",
        visible_alias = "log-json",
        help_heading = "Output",
        help = "Emit logs as JSON lines."
    )]
    pub log_json: bool,

    #[arg(
        short = 'd',
        long = "dt",
        visible_alias = "data",
        value_name = "FILE",
        help_heading = "Input",
        help = "Roster JSON file (defaults to ./data.json)."
    )]
    pub data: Option<String>,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.rosterview/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "ic",
        visible_alias = "init-config",
        help_heading = "Input",
        help = "Write a default config file and exit."
    )]
    pub init_config: bool,

    #[arg(
        short = 'b',
        long = "bd",
        visible_alias = "bind",
        value_name = "ADDR",
        help_heading = "Server",
        help = "Listen address (defaults to 127.0.0.1:8080)."
    )]
    pub bind: Option<String>,

    #[arg(
        long = "tt",
        visible_alias = "title",
        value_name = "TEXT",
        help_heading = "Page",
        help = "Page title."
    )]
    pub title: Option<String>,

    #[arg(
        long = "st",
        visible_alias = "subtitle",
        value_name = "TEXT",
        help_heading = "Page",
        help = "Subtitle shown under the title and in the footer."
    )]
    pub subtitle: Option<String>,

    #[arg(
        long = "css",
        visible_alias = "stylesheet",
        value_name = "FILE",
        help_heading = "Page",
        help = "Serve this file at /style.css instead of the built-in stylesheet."
    )]
    pub stylesheet: Option<String>,

    #[arg(
        short = 'o',
        long = "out",
        visible_alias = "output",
        value_name = "FILE",
        help_heading = "Render",
        help = "Render the page once into a file instead of serving it."
    )]
    pub output: Option<String>,

    #[arg(
        short = 'q',
        long = "sq",
        visible_alias = "search",
        value_name = "TEXT",
        help_heading = "Render",
        help = "Search query applied to the rendered page (requires --output)."
    )]
    pub search: Option<String>,

    #[arg(
        short = 'x',
        long = "ex",
        visible_alias = "export",
        help_heading = "Render",
        help = "Render the print/export view (requires --output)."
    )]
    pub export: bool,
}
