use crate::cli::args::{Cli, Commands, RunArgs};
use crate::core::model::PipelineStep;
use crate::core::navigation::{ModuleEntry, NavigationTree};
use crate::core::payload::{self, RunSummary};
use crate::core::schema;
use crate::report;
use anyhow::{Context, Result, bail};
use clap::Parser;
use crossbeam_channel as channel;
use log::{info, warn};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

pub fn entry() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => run(args),
    }
}

fn run(args: RunArgs) -> Result<()> {
    let stats = stats_enabled();
    let t0 = Instant::now();

    stage(stats, "preflight", || {
        if !args.data_dir.is_dir() {
            bail!("data directory not found: {}", args.data_dir.display());
        }
        if args.threads == 0 {
            bail!("--threads must be >= 1");
        }
        Ok(())
    })?;

    let t_load = Instant::now();
    let versions_path = args.data_dir.join("versions.json");
    let versions = payload::load_versions(&versions_path)
        .with_context(|| "failed to load the module registry")?;

    let summary_path = args.data_dir.join("summary.json");
    let summary = if summary_path.is_file() {
        payload::load_summary(&summary_path)?
    } else {
        info!("no summary.json found, overview will be thin");
        RunSummary::default()
    };
    stage_done(stats, "load", t_load);

    // The registry drives both navigation and the render job list: a module
    // gets a page iff a metrics blob for it exists (and it was selected).
    let t_registry = Instant::now();
    let mut registry = Vec::new();
    let mut jobs: Vec<(String, PathBuf)> = Vec::new();
    for entry in &versions {
        let Some(step) = PipelineStep::parse(&entry.step) else {
            warn!(
                "module '{}' names unknown pipeline step '{}', skipped",
                entry.name, entry.step
            );
            continue;
        };
        let selected = args
            .modules
            .as_ref()
            .is_none_or(|filter| filter.iter().any(|m| m == &entry.name));
        let blob_path = args.data_dir.join(format!("{}.json", entry.name));
        let page = if selected && blob_path.is_file() {
            Some(format!("{}.html", entry.name))
        } else {
            if selected {
                info!("no metrics blob for module '{}'", entry.name);
            }
            None
        };
        if page.is_some() {
            jobs.push((entry.name.clone(), blob_path));
        }
        registry.push(ModuleEntry {
            name: entry.name.clone(),
            title: schema::display_title(&entry.name),
            step,
            page,
            new_tab: schema::lookup(&entry.name).is_some_and(|s| s.new_tab),
        });
    }
    let nav = NavigationTree::build(&registry);
    stage_done(stats, "registry", t_registry);

    let modules_dir = args.out.join("modules");
    fs::create_dir_all(&modules_dir)
        .with_context(|| format!("failed to create {}", modules_dir.display()))?;

    let t_overview = Instant::now();
    report::overview::write(&args.out.join("index.html"), &summary, &versions, &nav)
        .with_context(|| "failed to write the overview page")?;
    stage_done(stats, "overview", t_overview);

    // Module pages are independent of each other; fan them out over a small
    // worker pool. A failed page is logged and the rest still render.
    let t_render = Instant::now();
    let job_count = jobs.len();
    let threads = args.threads.min(job_count.max(1));
    let (job_tx, job_rx) = channel::unbounded::<(String, PathBuf)>();
    let (err_tx, err_rx) = channel::unbounded::<anyhow::Error>();
    let nav_ref = &nav;
    let modules_dir_ref = &modules_dir;
    thread::scope(|scope| {
        for _ in 0..threads {
            let rx = job_rx.clone();
            let err = err_tx.clone();
            scope.spawn(move || {
                for (name, blob_path) in rx.iter() {
                    let out_path = modules_dir_ref.join(format!("{name}.html"));
                    let result = payload::load_module(&blob_path, &name).and_then(|blob| {
                        report::html::write_module(&out_path, &name, &blob, nav_ref)
                    });
                    if let Err(e) = result {
                        let _ = err.send(e.context(format!("module '{name}' failed")));
                    }
                }
            });
        }
        drop(job_rx);
        for job in jobs {
            let _ = job_tx.send(job);
        }
        drop(job_tx);
    });
    drop(err_tx);
    let mut failed = 0usize;
    for e in err_rx.iter() {
        warn!("{e:#}");
        failed += 1;
    }
    stage_done(stats, "render", t_render);
    info!("rendered {} of {} module pages", job_count - failed, job_count);

    if !args.no_zip {
        let t_zip = Instant::now();
        report::zip::write_zip(&args.out).with_context(|| "failed to create zip output")?;
        stage_done(stats, "zip", t_zip);
    }

    if stats {
        eprintln!("DGE_REPORT_STATS output_dir={}", args.out.display());
        eprintln!("DGE_REPORT_STATS total={}", fmt_dur(t0.elapsed()));
    }

    Ok(())
}

fn stats_enabled() -> bool {
    matches!(env::var("DGE_REPORT_STATS").as_deref(), Ok("1"))
}

fn stage<F>(stats: bool, name: &str, f: F) -> Result<()>
where
    F: FnOnce() -> Result<()>,
{
    let t = Instant::now();
    let res = f();
    if stats {
        eprintln!("DGE_REPORT_STATS stage={} time={}", name, fmt_dur(t.elapsed()));
    }
    res
}

fn stage_done(stats: bool, name: &str, t: Instant) {
    if stats {
        eprintln!("DGE_REPORT_STATS stage={} time={}", name, fmt_dur(t.elapsed()));
    }
}

fn fmt_dur(d: Duration) -> String {
    if d.as_secs_f64() < 1.0 {
        format!("{}ms", d.as_millis())
    } else {
        format!("{:.3}s", d.as_secs_f64())
    }
}
