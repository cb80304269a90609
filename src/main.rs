use clap::Parser;
use cut_packer::render;
use cut_packer::solver::Packer;
use cut_packer::types::{DEFAULT_MAX_NODES, Demand, SearchBudget};
use std::time::Duration;
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "cut_packer",
    about = "1D cutting stock optimizer: fewest stock bars for a cut list"
)]
struct Cli {
    /// Stock bar length (e.g. 600)
    #[arg(long)]
    capacity: f64,

    /// Cut lengths as LEN or LEN:qty (e.g. 120 250:2)
    #[arg(long = "cuts", num_args = 1.., required = true)]
    cuts: Vec<String>,

    /// Length lost per cut to the blade, added to every piece (default: 0)
    #[arg(long, default_value_t = 0.0)]
    buffer: f64,

    /// Give up after exploring this many search nodes (0 = no limit)
    #[arg(long, default_value_t = DEFAULT_MAX_NODES)]
    max_nodes: u64,

    /// Give up after this many milliseconds
    #[arg(long)]
    time_limit_ms: Option<u64>,

    /// Show an ASCII diagram of each bar
    #[arg(long)]
    layout: bool,

    /// Print the solution as JSON
    #[arg(long)]
    json: bool,

    /// Log search progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn budget(&self) -> SearchBudget {
        let mut budget = SearchBudget::unbounded();
        if self.max_nodes > 0 {
            budget = budget.with_max_nodes(self.max_nodes);
        }
        if let Some(ms) = self.time_limit_ms {
            budget = budget.with_time_limit(Duration::from_millis(ms));
        }
        budget
    }
}

fn parse_length(s: &str, whole: &str) -> Result<f64, String> {
    let length = s
        .parse::<f64>()
        .map_err(|_| format!("invalid length in '{}'", whole))?;
    if !length.is_finite() || length <= 0.0 {
        return Err(format!("length must be positive in '{}'", whole));
    }
    Ok(length)
}

fn parse_cut(s: &str) -> Result<Demand, String> {
    let parts: Vec<&str> = s.split(':').collect();
    let (length, qty) = match parts.as_slice() {
        [length] => (parse_length(length, s)?, 1),
        [length, qty] => {
            let qty = qty
                .parse::<u32>()
                .map_err(|_| format!("invalid quantity in '{}'", s))?;
            (parse_length(length, s)?, qty)
        }
        _ => return Err(format!("invalid cut '{}', expected LEN or LEN:qty", s)),
    };
    if qty == 0 {
        return Err(format!("quantity must be non-zero in '{}'", s));
    }
    Ok(Demand::new(length, qty))
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let demands: Vec<Demand> = cli
        .cuts
        .iter()
        .map(|c| parse_cut(c))
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });

    let packer = Packer::new(cli.capacity, cli.buffer).with_budget(cli.budget());
    let solution = packer.pack_demands(&demands).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    if cli.json {
        match serde_json::to_string_pretty(&solution) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    print!("{}", render::format_report(&solution));
    if cli.layout {
        println!();
        for (i, bin) in solution.bins.iter().enumerate() {
            println!("Bar {}:", i + 1);
            println!("{}", render::render_bar(solution.capacity, bin));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cut_with_and_without_qty() {
        assert_eq!(parse_cut("120").unwrap(), Demand::new(120.0, 1));
        assert_eq!(parse_cut("250.5:3").unwrap(), Demand::new(250.5, 3));
    }

    #[test]
    fn test_parse_cut_rejects_bad_input() {
        assert!(parse_cut("abc").is_err());
        assert!(parse_cut("10:0").is_err());
        assert!(parse_cut("10:x").is_err());
        assert!(parse_cut("-4").is_err());
        assert!(parse_cut("0").is_err());
        assert!(parse_cut("1:2:3").is_err());
    }

    #[test]
    fn test_cli_budget() {
        let cli = Cli::parse_from([
            "cut_packer",
            "--capacity",
            "600",
            "--cuts",
            "120",
            "250:2",
            "--max-nodes",
            "0",
            "--time-limit-ms",
            "500",
        ]);
        assert_eq!(cli.cuts, vec!["120", "250:2"]);
        let budget = cli.budget();
        assert_eq!(budget.max_nodes, None);
        assert_eq!(budget.time_limit, Some(Duration::from_millis(500)));
    }
}
