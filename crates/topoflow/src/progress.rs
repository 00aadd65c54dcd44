use indicatif::{ProgressBar, ProgressStyle};

/// ワークフロー実行中のスピナー表示
pub struct WorkflowProgress {
    progress_bar: ProgressBar,
}

impl WorkflowProgress {
    pub fn new(workflow: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap(),
        );
        pb.set_message(format!("{} を実行中...", workflow));

        Self { progress_bar: pb }
    }

    pub fn set_message(&self, msg: &str) {
        self.progress_bar.set_message(msg.to_string());
    }

    pub fn finish(&self, message: &str) {
        self.progress_bar.finish_with_message(message.to_string());
    }
}
