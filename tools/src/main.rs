//! roster-runner: headless billing-status runner.
//!
//! Usage:
//!   roster-runner --generate 500 --seed 7 --tenant t-1 --as-of 2025-06-14
//!   roster-runner --db roster.db --tenant t-1 --json
//!   roster-runner --db roster.db --ipc-mode

use anyhow::Result;
use billing_core::{
    clock::SystemClock,
    config::EngineConfig,
    engine::{AlertQuery, BillingEngine},
    roster::AlertRoster,
    store::RosterStore,
    subscriber::{Subscriber, ISO_DATE},
    synthetic::RosterGenerator,
};
use chrono::NaiveDate;
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    Alerts {
        tenant_id: String,
        #[serde(default)]
        reference_date: Option<NaiveDate>,
    },
    Status {
        tenant_id: String,
        subscriber_id: String,
        #[serde(default)]
        reference_date: Option<NaiveDate>,
    },
    RecordPayment {
        tenant_id: String,
        subscriber_id: String,
        paid_on: NaiveDate,
    },
    Quit,
}

#[derive(serde::Serialize)]
struct StatusReply {
    tenant_id:     String,
    subscriber_id: String,
    status:        String,
    label:         String,
    next_due_date: Option<NaiveDate>,
}

#[derive(serde::Serialize)]
struct PaymentReply {
    tenant_id:     String,
    subscriber_id: String,
    changed:       bool,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let generate = parse_arg(&args, "--generate", 0usize);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let json = args.iter().any(|a| a == "--json");
    let db = str_arg(&args, "--db").unwrap_or(":memory:");
    let data_dir = str_arg(&args, "--data-dir").unwrap_or("./data");
    let tenant = str_arg(&args, "--tenant");
    let as_of = str_arg(&args, "--as-of")
        .map(|raw| {
            NaiveDate::parse_from_str(raw, ISO_DATE)
                .map_err(|e| anyhow::anyhow!("Invalid --as-of {raw}: {e}"))
        })
        .transpose()?;

    let config = match EngineConfig::load_if_present(data_dir)? {
        Some(config) => config,
        None => {
            log::warn!("No billing.json in {data_dir}; using default engine config");
            EngineConfig::default()
        }
    };
    let engine = BillingEngine::new(config).with_clock(Box::new(SystemClock));
    let reference = engine.reference_date(as_of)?;

    let quiet = ipc_mode || json;
    if !quiet {
        println!("Billing status engine: roster-runner");
        println!("  db:        {db}");
        println!("  data_dir:  {data_dir}");
        println!("  as_of:     {reference}");
        println!();
    }

    let store = RosterStore::open(db)?;
    store.migrate()?;

    if generate > 0 {
        let tenant_id = tenant.unwrap_or("t-1");
        let roster = RosterGenerator::new(seed).generate(tenant_id, generate, reference)?;
        for sub in &roster {
            store.insert_subscriber(sub)?;
        }
        log::info!("Generated {generate} subscribers for {tenant_id} (seed {seed})");
    }

    if ipc_mode {
        return run_ipc_loop(&engine, &store);
    }

    let tenants = match tenant {
        Some(t) => vec![t.to_string()],
        None    => store.tenants()?,
    };
    for tenant_id in tenants {
        let subscribers = store.subscribers_for_tenant(&tenant_id, &engine.config)?;
        let query = AlertQuery { tenant_id, reference_date: Some(reference) };
        let alerts = engine.alerts(&subscribers, &query)?;
        if json {
            println!("{}", serde_json::to_string(&alerts)?);
        } else {
            print_summary(&alerts, &engine, &subscribers);
        }
    }
    Ok(())
}

fn run_ipc_loop(engine: &BillingEngine, store: &RosterStore) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let reply = match serde_json::from_str::<IpcCommand>(&buffer) {
            Ok(IpcCommand::Quit) => break,
            Ok(cmd) => handle_command(engine, store, cmd)
                .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() })),
            Err(e) => serde_json::json!({ "error": e.to_string() }),
        };
        writeln!(stdout, "{reply}")?;
        stdout.flush()?;
    }
    Ok(())
}

fn handle_command(
    engine: &BillingEngine,
    store: &RosterStore,
    cmd: IpcCommand,
) -> Result<serde_json::Value> {
    let value = match cmd {
        IpcCommand::Alerts { tenant_id, reference_date } => {
            let subscribers = store.subscribers_for_tenant(&tenant_id, &engine.config)?;
            let query = AlertQuery { tenant_id, reference_date };
            serde_json::to_value(engine.alerts(&subscribers, &query)?)?
        }
        IpcCommand::Status { tenant_id, subscriber_id, reference_date } => {
            let sub = store.subscriber(&tenant_id, &subscriber_id, &engine.config)?;
            let status = engine.status(&sub, reference_date)?;
            let next_due_date = if sub.active { engine.next_due(&sub, reference_date)? } else { None };
            serde_json::to_value(StatusReply {
                tenant_id,
                subscriber_id,
                status: status.as_str().to_string(),
                label: status.label().to_string(),
                next_due_date,
            })?
        }
        IpcCommand::RecordPayment { tenant_id, subscriber_id, paid_on } => {
            let changed = store.record_payment(&tenant_id, &subscriber_id, paid_on)?;
            serde_json::to_value(PaymentReply { tenant_id, subscriber_id, changed })?
        }
        IpcCommand::Quit => serde_json::Value::Null,
    };
    Ok(value)
}

fn print_summary(alerts: &AlertRoster, engine: &BillingEngine, subscribers: &[Subscriber]) {
    let s = &alerts.summary;
    println!("=== TENANT {} as of {} ===", alerts.tenant_id, alerts.reference_date);
    println!("  subscribers:     {}", s.total);
    println!("  active:          {}", s.active);
    println!("  current:         {}", s.current);
    println!("  upcoming:        {}", s.upcoming);
    println!("  overdue:         {}", s.overdue);
    println!("  inactive:        {}", s.inactive);
    println!("  unknown:         {}", s.unknown);
    println!("  errors:          {}", s.errors.len());
    println!("  expected/month:  ${:.0}", s.expected_monthly_revenue);
    println!("  outstanding:     ${:.0}", s.outstanding_fees);

    println!();
    println!("=== UPCOMING ===");
    if alerts.upcoming.is_empty() {
        println!("  (none)");
    }
    for a in &alerts.upcoming {
        println!(
            "  {} | cutoff {} | {} day(s) left | grace {} day(s)",
            a.subscriber.id, a.cutoff_date, a.days_remaining, a.grace_days_left
        );
    }

    println!();
    println!("=== OVERDUE ===");
    if alerts.overdue.is_empty() {
        println!("  (none)");
    }
    for a in &alerts.overdue {
        println!(
            "  {} | missed {} | {} day(s) overdue",
            a.subscriber.id, a.missed_cutoff, a.days_overdue
        );
    }

    if !s.errors.is_empty() {
        println!();
        println!("=== RECORD ERRORS ===");
        for e in &s.errors {
            println!("  {} | {:?} | {}", e.subscriber_id, e.kind, e.detail);
        }
    }

    println!();
    println!("=== PROGRAMS ===");
    for p in engine.program_breakdown(subscribers, &alerts.tenant_id) {
        println!("  {:<12} active {:>4} | inactive {:>4}", p.program, p.active, p.inactive);
    }
    println!();
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn str_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
