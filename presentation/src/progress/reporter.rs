//! Progress reporting while explainers run
//!
//! Both reporters write to stderr so JSON on stdout stays parseable.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use xplain_application::ProgressNotifier;

/// Reports progress with a single progress bar over all explainers
pub struct ProgressReporter {
    bar: Mutex<Option<ProgressBar>>,
    running: Mutex<Vec<String>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
            running: Mutex::new(Vec::new()),
        }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn running_message(&self) -> String {
        match self.running.lock() {
            Ok(running) if !running.is_empty() => format!("running {}", running.join(", ")),
            _ => String::new(),
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_dispatch_start(&self, total: usize) {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(Self::bar_style());
        pb.set_prefix("Explaining");
        pb.set_message("Starting...");

        if let Ok(mut bar) = self.bar.lock() {
            *bar = Some(pb);
        }
    }

    fn on_explainer_start(&self, name: &str) {
        if let Ok(mut running) = self.running.lock() {
            running.push(name.to_string());
        }
        if let Ok(bar) = self.bar.lock()
            && let Some(pb) = bar.as_ref()
        {
            pb.set_message(self.running_message());
        }
    }

    fn on_explainer_complete(&self, name: &str, success: bool) {
        if let Ok(mut running) = self.running.lock() {
            running.retain(|n| n != name);
        }
        if let Ok(bar) = self.bar.lock()
            && let Some(pb) = bar.as_ref()
        {
            if !success {
                pb.println(format!("  {} {} (failed)", "x".red(), name));
            }
            pb.set_message(self.running_message());
            pb.inc(1);
        }
    }

    fn on_dispatch_complete(&self) {
        if let Ok(mut bar) = self.bar.lock()
            && let Some(pb) = bar.take()
        {
            pb.finish_with_message(format!("{}", "complete!".green()));
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_dispatch_start(&self, total: usize) {
        eprintln!(
            "{} {} ({} explainers)",
            "->".cyan(),
            "Explaining".bold(),
            total
        );
    }

    fn on_explainer_complete(&self, name: &str, success: bool) {
        if success {
            eprintln!("  {} {}", "v".green(), name);
        } else {
            eprintln!("  {} {} (failed)", "x".red(), name);
        }
    }

    fn on_dispatch_complete(&self) {
        eprintln!();
    }
}
