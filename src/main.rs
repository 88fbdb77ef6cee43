use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use seed_journal::config::{LogConfig, StoreConfig};
use seed_journal::telemetry::init_tracing;
use seed_journal::{PlantingDraft, PlantingEntry, PlantingId, PlantingStore, RegistryError, Time};

#[derive(Parser)]
#[command(name = "seed-journal")]
#[command(about = "Record when seeds were started and when they germinated")]
struct Cli {
    #[command(flatten)]
    store: StoreConfig,

    #[command(flatten)]
    log: LogConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Record a new planting
    Add(AddArgs),
    /// List plantings sorted by name
    List {
        /// Only plantings in this soil type
        #[arg(long)]
        soil: Option<String>,
        /// One line per planting: id and name
        #[arg(long)]
        ids: bool,
    },
    /// Show one planting
    Show {
        #[arg(long)]
        id: u64,
    },
    /// Change an existing planting
    Update(UpdateArgs),
    /// Remove a planting permanently
    Remove {
        #[arg(long)]
        id: u64,
    },
    /// List the soil types in use
    Soils,
}

#[derive(Args, Debug)]
struct AddArgs {
    /// Plant name, e.g. "Tomato"
    #[arg(short = 'n', long)]
    name: String,
    /// Growing medium, e.g. "Seed starting mix"
    #[arg(short = 's', long)]
    soil: String,
    /// Date the seed was started (YYYY-MM-DD)
    #[arg(long, value_parser = Time::parse_date)]
    started: Time,
    /// Hours of light per day (0-24)
    #[arg(short = 'l', long)]
    light: f64,
    /// Date the seed germinated (YYYY-MM-DD)
    #[arg(short = 'g', long, value_parser = Time::parse_date)]
    germinated: Option<Time>,
}

#[derive(Args, Debug)]
struct UpdateArgs {
    #[arg(long)]
    id: u64,
    #[arg(short = 'n', long)]
    name: Option<String>,
    #[arg(short = 's', long)]
    soil: Option<String>,
    #[arg(long, value_parser = Time::parse_date)]
    started: Option<Time>,
    #[arg(short = 'l', long)]
    light: Option<f64>,
    #[arg(short = 'g', long, value_parser = Time::parse_date)]
    germinated: Option<Time>,
    /// Mark the planting as not yet germinated
    #[arg(long, conflicts_with = "germinated")]
    clear_germination: bool,
}

impl UpdateArgs {
    /// Merge the given flags over the current values
    fn apply_to(&self, current: PlantingDraft) -> PlantingDraft {
        let germination_date = if self.clear_germination {
            None
        } else {
            self.germinated.or(current.germination_date)
        };

        PlantingDraft {
            name: self.name.as_deref().map(str::trim).map_or(current.name, str::to_string),
            soil_type: self
                .soil
                .as_deref()
                .map(str::trim)
                .map_or(current.soil_type, str::to_string),
            seed_start_date: self.started.unwrap_or(current.seed_start_date),
            daily_light_hours: self.light.unwrap_or(current.daily_light_hours),
            germination_date,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log);

    if let Err(err) = run(cli) {
        match err.downcast_ref::<RegistryError>() {
            Some(RegistryError::Validation(errors)) => {
                eprintln!("❌ Please fix the following:");
                for e in errors {
                    eprintln!("   • {}", e);
                }
            }
            _ => eprintln!("❌ {:#}", err),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut store = cli.store.open()?;

    match cli.command {
        Commands::Add(args) => {
            let mut draft =
                PlantingDraft::new(args.name.trim(), args.soil.trim(), args.started, args.light);
            draft.germination_date = args.germinated;

            let id = store.create(draft)?;
            println!("✓ Planting added, ID: {}", id);
        }
        Commands::List { soil, ids } => {
            let entries = match soil.as_deref() {
                Some(soil) => store.list_by_soil_type(soil)?,
                None => store.list_sorted_by_name()?,
            };

            if entries.is_empty() {
                println!("No plantings found");
            }

            for entry in &entries {
                if ids {
                    println!("{}, '{}'", entry.id, entry.name);
                } else {
                    println!("{}\n", render_entry(entry));
                }
            }

            if !ids && !entries.is_empty() {
                let noun = plural(entries.len() as i64, "entry", "entries");
                println!("Tracking {} seed {}", entries.len(), noun);
            }
        }
        Commands::Show { id } => {
            let entry = store.get(PlantingId(id))?;
            println!("{}", render_entry(&entry));
        }
        Commands::Update(args) => {
            let id = PlantingId(args.id);
            let current = store.get(id)?;
            store.update(id, args.apply_to(current.to_draft()))?;
            println!("✓ Planting ID {} updated", id);
        }
        Commands::Remove { id } => {
            store.delete(PlantingId(id))?;
            println!("✓ Planting ID {} removed", id);
        }
        Commands::Soils => {
            let soils = store.soil_types()?;
            if soils.is_empty() {
                println!("No soil types recorded yet");
            }
            for soil in soils {
                println!("{}", soil);
            }
        }
    }

    Ok(())
}

fn plural<'a>(n: i64, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 {
        one
    } else {
        many
    }
}

fn germination_status(entry: &PlantingEntry) -> String {
    match (entry.germination_date, entry.days_to_germinate()) {
        (Some(date), Some(days)) => format!(
            "Germinated in {} {} ({})",
            days,
            plural(days, "day", "days"),
            date.format_long()
        ),
        _ => "Growing".to_string(),
    }
}

fn render_entry(entry: &PlantingEntry) -> String {
    format!(
        "#{}  {}\n    Soil:    {}\n    Planted: {}\n    Light:   {} hours/day\n    Status:  {}",
        entry.id,
        entry.name,
        entry.soil_type,
        entry.seed_start_date.format_long(),
        entry.daily_light_hours,
        germination_status(entry),
    )
}
