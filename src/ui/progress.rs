use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Resolution of the session bar; positions are fractions scaled to this.
pub const SESSION_BAR_STEPS: u64 = 1000;

pub fn create_session_progress(multi_progress: &MultiProgress) -> ProgressBar {
    let pb = multi_progress.add(ProgressBar::new(SESSION_BAR_STEPS));
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{prefix:.bold} [{bar:40.cyan}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("⣀⣤⣦⣶⣷⣿ "),
    );
    pb.set_prefix("Session");
    pb
}

pub fn create_curve_line(multi_progress: &MultiProgress) -> ProgressBar {
    let pb = multi_progress.add(ProgressBar::new_spinner());
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{prefix:.bold}   {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_prefix("Tempo");
    pb
}

pub fn create_pulse_spinner(multi_progress: &MultiProgress) -> ProgressBar {
    let pb = multi_progress.add(ProgressBar::new_spinner());
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.dim} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_prefix("Pulse  ");
    pb
}

pub fn create_help_line(multi_progress: &MultiProgress) -> ProgressBar {
    let pb = multi_progress.add(ProgressBar::new_spinner());
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{wide_msg:.yellow}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(
        "Space: start/pause | S: stop | ←/→: start BPM | ↓/↑: end BPM | 1-7: sound | Q: quit",
    );
    pb
}
