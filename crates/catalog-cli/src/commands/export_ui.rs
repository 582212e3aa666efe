use catalog_core::{ExportObserver, SkippedItem};
use catalog_sources::LibrarySection;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Console progress for an export run: one spinner per library while it is
/// being fetched. Without a terminal the same events go to the log.
pub struct ExportUI {
    multi: MultiProgress,
    current: Mutex<Option<ProgressBar>>,
    skipped: AtomicUsize,
    interactive: bool,
}

impl ExportUI {
    pub fn new(quiet: bool) -> Self {
        let interactive = !quiet && is_interactive();
        if !interactive {
            tracing::info!(
                operation = "ui_init",
                mode = "non_interactive",
                "Progress bars disabled, using structured logging"
            );
        }
        Self {
            multi: MultiProgress::new(),
            current: Mutex::new(None),
            skipped: AtomicUsize::new(0),
            interactive,
        }
    }

    pub fn skipped(&self) -> usize {
        self.skipped.load(Ordering::Relaxed)
    }

    fn spinner(&self, msg: String) -> ProgressBar {
        let pb = self.multi.add(ProgressBar::new_spinner());
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
            pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
        }
        pb.set_message(msg);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    fn take_current(&self) -> Option<ProgressBar> {
        self.current.lock().ok().and_then(|mut slot| slot.take())
    }
}

impl ExportObserver for ExportUI {
    fn library_started(&self, section: &LibrarySection) {
        if !self.interactive {
            tracing::info!(operation = "library", library = %section.title, "Fetching library");
            return;
        }
        let pb = self.spinner(format!("{}: fetching...", section.title));
        if let Ok(mut slot) = self.current.lock() {
            if let Some(previous) = slot.replace(pb) {
                previous.finish_and_clear();
            }
        }
    }

    fn library_finished(&self, section: &LibrarySection, items: usize) {
        if !self.interactive {
            tracing::info!(operation = "library", library = %section.title, items, "Library done");
            return;
        }
        if let Some(pb) = self.take_current() {
            pb.finish_with_message(format!("{}: {} items", section.title, items));
        }
    }

    fn item_skipped(&self, item: &SkippedItem) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
        let line = format!("Skipped '{}' in {}: {}", item.title, item.library, item.reason);
        if self.interactive {
            let _ = self.multi.println(line);
        } else {
            tracing::warn!(operation = "skip", library = %item.library, title = %item.title, reason = %item.reason, "{}", line);
        }
    }
}

impl Drop for ExportUI {
    fn drop(&mut self) {
        if let Some(pb) = self.take_current() {
            pb.finish_and_clear();
        }
    }
}

fn is_interactive() -> bool {
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::SkipReason;
    use catalog_sources::LibraryKind;

    #[test]
    fn test_quiet_ui_counts_skips() {
        let ui = ExportUI::new(true);
        let section = LibrarySection {
            key: "1".to_string(),
            title: "Movies".to_string(),
            kind: LibraryKind::Movie,
        };
        ui.library_started(&section);
        ui.item_skipped(&SkippedItem {
            library: "Movies".to_string(),
            title: "Untitled".to_string(),
            reason: SkipReason::MissingFilePath,
        });
        ui.library_finished(&section, 3);
        assert_eq!(ui.skipped(), 1);
    }
}
