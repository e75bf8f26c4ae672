//! `crm` command-line entry point.
//!
//! # Responsibility
//! - Render record lists, the dashboard, the pipeline board and global
//!   search over the configured Record Store backend.
//! - Keep all business rules in `crm_core`; this binary only parses
//!   arguments and prints.

use clap::{Parser, Subcommand, ValueEnum};
use crm_core::kanban::{DragEnd, DropTarget, StageMove};
use crm_core::lookup::PLACEHOLDER;
use crm_core::notify::{Notice, NoticeLevel, Notifier};
use crm_core::page::{CompaniesPage, ContactsPage, DashboardPage, DealsPage, ListPage};
use crm_core::store::RecordStore;
use crm_core::view::{FieldDescriptor, Listable};
use crm_core::{CrmConfig, PipelineStage, StatusFilter, StoreSet};
use log::error;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "crm")]
#[command(version, about = "CRM records from the command line")]
struct Cli {
    /// TOML configuration file; `CRM_*` environment variables override it.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Overrides the configured log level.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List one entity kind through search, filter, sort and pagination
    List {
        #[arg(value_enum)]
        kind: Kind,
        #[arg(short, long, default_value = "")]
        search: String,
        /// Contact status, or `all`
        #[arg(long, default_value = "all")]
        status: String,
        /// Field to sort by (snake_case or camelCase)
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        desc: bool,
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    /// Pipeline totals and per-stage distribution
    Dashboard,
    /// Deals grouped into kanban columns
    Board,
    /// Move a deal to another stage (by stage name or id)
    Move { deal_id: i64, stage: String },
    /// Search contacts, companies and deals at once
    Search { text: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Companies,
    Contacts,
    Deals,
    Stages,
}

struct ListArgs {
    search: String,
    status: String,
    sort: Option<String>,
    desc: bool,
    page: usize,
}

/// Prints warnings and errors for the user; everything goes to the log.
struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Warning | NoticeLevel::Error => eprintln!("{}", notice.message),
            NoticeLevel::Success | NoticeLevel::Info => println!("{}", notice.message),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut config = CrmConfig::load_with_env(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = Some(level);
    }
    crm_core::init_from_config(&config.logging)?;

    let stores = StoreSet::from_config(&config)?;
    let notifier: Arc<dyn Notifier> = Arc::new(StderrNotifier);

    match cli.command {
        Commands::List {
            kind,
            search,
            status,
            sort,
            desc,
            page,
        } => {
            let args = ListArgs {
                search,
                status,
                sort,
                desc,
                page,
            };
            list(kind, &stores, notifier, &args).await
        }
        Commands::Dashboard => dashboard(stores, notifier).await,
        Commands::Board => board(&stores, notifier).await,
        Commands::Move { deal_id, stage } => move_deal(&stores, notifier, deal_id, stage).await,
        Commands::Search { text } => {
            let hits = crm_core::search_all(&stores, &crm_core::SearchQuery::new(text)).await;
            if hits.is_empty() {
                println!("no matches");
            }
            for hit in hits {
                println!(
                    "{:<15} #{:<4} {} ({})",
                    hit.kind.label(),
                    hit.id,
                    hit.title,
                    hit.subtitle
                );
            }
            Ok(())
        }
    }
}

async fn list(
    kind: Kind,
    stores: &StoreSet,
    notifier: Arc<dyn Notifier>,
    args: &ListArgs,
) -> Result<(), Box<dyn Error>> {
    match kind {
        Kind::Companies => {
            let mut page = CompaniesPage::new(stores, notifier);
            page.mount().await;
            apply_query(&mut page.list, args)?;
            for row in page.rows() {
                println!(
                    "#{:<4} {:<28} {:<16} {:>14.2}  contact: {}",
                    row.company.id,
                    row.company.name,
                    row.company.industry,
                    row.company.revenue,
                    row.primary_contact
                );
            }
            print_footer(&page.list);
        }
        Kind::Contacts => {
            let mut page = ContactsPage::new(stores, notifier);
            page.mount().await;
            apply_query(&mut page.list, args)?;
            for row in page.rows() {
                println!(
                    "#{:<4} {:<24} {:<30} {:<9} company: {}",
                    row.contact.id,
                    row.contact.full_name(),
                    row.contact.email,
                    row.contact.status,
                    row.company
                );
            }
            print_footer(&page.list);
        }
        Kind::Deals => {
            let mut page = DealsPage::new(stores, notifier);
            page.mount().await;
            apply_query(&mut page.list, args)?;
            for row in page.rows() {
                println!(
                    "#{:<4} {:<28} {:>12.2} {:<12} {:<10} {} / {}",
                    row.deal.id,
                    row.deal.name,
                    row.deal.amount,
                    row.deal.stage,
                    row.deal
                        .close_date
                        .map_or_else(|| PLACEHOLDER.to_string(), |date| date.to_string()),
                    row.contact,
                    row.company
                );
            }
            print_footer(&page.list);
        }
        Kind::Stages => {
            let mut page: ListPage<PipelineStage, dyn RecordStore<PipelineStage>> =
                ListPage::new(Arc::clone(&stores.stages), notifier);
            page.load().await;
            apply_query(&mut page, args)?;
            for stage in page.view().page_items {
                println!("{:>2}. {:<16} {}", stage.position, stage.name, stage.color);
            }
            print_footer(&page);
        }
    }
    Ok(())
}

fn apply_query<R, S>(page: &mut ListPage<R, S>, args: &ListArgs) -> Result<(), Box<dyn Error>>
where
    R: Listable,
    S: RecordStore<R> + ?Sized,
{
    if let Some(key) = &args.sort {
        let field = R::Field::from_key(key).ok_or_else(|| {
            let known: Vec<&str> = R::Field::ALL.iter().map(|field| field.key()).collect();
            format!("unknown sort field `{key}`; expected one of {}", known.join(", "))
        })?;
        if page.query().sort_field != field {
            page.toggle_sort(field);
        }
    }
    if args.desc {
        page.toggle_sort(page.query().sort_field);
    }
    page.set_search_text(args.search.as_str());
    page.set_status_filter(StatusFilter::for_contacts(&args.status)?);
    page.go_to_page(args.page);
    Ok(())
}

fn print_footer<R, S>(page: &ListPage<R, S>)
where
    R: Listable,
    S: RecordStore<R> + ?Sized,
{
    let view = page.view();
    println!(
        "page {}/{} ({} matching)",
        page.query().page,
        view.total_pages,
        view.total_count
    );
}

async fn dashboard(stores: StoreSet, notifier: Arc<dyn Notifier>) -> Result<(), Box<dyn Error>> {
    let mut page = DashboardPage::new(stores, notifier);
    if !page.load().await {
        return Err("dashboard unavailable".into());
    }
    let Some(metrics) = page.metrics() else {
        return Ok(());
    };

    println!("Total pipeline value: {:.2}", metrics.total_pipeline_value);
    println!("Open deals:           {}", metrics.open_deals);
    println!(
        "Won deals:            {} ({:.2})",
        metrics.won_deals, metrics.won_value
    );
    println!("Active contacts:      {}", metrics.active_contacts);
    println!("Companies:            {}", metrics.companies);
    println!();
    for stage in &metrics.stages {
        println!(
            "{:<14} {:>3} deals {:>14.2} total {:>12.2} avg",
            stage.stage, stage.count, stage.value, stage.average_deal_size
        );
    }
    Ok(())
}

async fn board(stores: &StoreSet, notifier: Arc<dyn Notifier>) -> Result<(), Box<dyn Error>> {
    let mut page = DealsPage::new(stores, notifier);
    page.mount().await;
    for column in page.board() {
        println!(
            "== {} ({} deals, {:.2})",
            column.stage.name,
            column.count(),
            column.total_amount
        );
        for deal in column.deals {
            println!("   #{:<4} {:<28} {:>12.2}", deal.id, deal.name, deal.amount);
        }
    }
    Ok(())
}

async fn move_deal(
    stores: &StoreSet,
    notifier: Arc<dyn Notifier>,
    deal_id: i64,
    stage: String,
) -> Result<(), Box<dyn Error>> {
    let mut page = DealsPage::new(stores, notifier);
    page.mount().await;
    let drag = DragEnd {
        dragged: deal_id,
        over: Some(DropTarget::Column(stage)),
    };
    match page.move_deal(&drag).await? {
        StageMove::Moved { .. } => {}
        StageMove::SameStage => println!("deal #{deal_id} is already in that stage"),
        StageMove::NoTarget => return Err("no such stage".into()),
        StageMove::UnknownDeal => return Err(format!("deal #{deal_id} not found").into()),
    }
    Ok(())
}
