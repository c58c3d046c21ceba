use std::process::ExitCode;

use anyhow::Result;

use olcaoflow::{CalcRecordStore, PluginContext};

pub fn run(ctx: &PluginContext, limit: usize, past_days: Option<i64>) -> Result<ExitCode> {
    let store = CalcRecordStore::new(&ctx.config()?.work_dir);
    let records = store.list(limit, past_days)?;
    if records.is_empty() {
        println!("No OLCAO calculations found.");
        return Ok(ExitCode::SUCCESS);
    }

    println!("{:8}  {:19}  {:8}  {:12}  {:>5}", "ID", "CTIME (UTC)", "LABEL", "STATE", "EXIT");
    println!("{}", "-".repeat(62));
    for r in records {
        let id = r.id.to_string();
        let exit = r.exit_status.map(|s| s.to_string()).unwrap_or_else(|| "-".into());
        println!("{:8}  {:19}  {:8}  {:12}  {:>5}",
                 &id[..8],
                 r.ctime.format("%Y-%m-%d %H:%M:%S"),
                 r.label,
                 r.state.as_str(),
                 exit);
    }
    Ok(ExitCode::SUCCESS)
}
