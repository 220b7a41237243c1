use std::time::Duration;

use tokio::time::Instant;

use crate::{
    config::SETTINGS,
    declare::PageSection,
    dom::DocumentAccessor,
    logging,
};

/// Failures of the hidden-row expansion stage. All of them are recoverable:
/// the orchestrator degrades to a partial extraction instead of propagating.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExpandError {
    #[error("no row containing '{0}' was found")]
    RowNotFound(String),
    #[error("no expand control in the row containing '{0}'")]
    ControlNotFound(String),
    #[error("timed out after {timeout:?} waiting for a row containing '{keyword}'")]
    Timeout { keyword: String, timeout: Duration },
}

/// Activates the expand control in the row containing `trigger`, then waits
/// for a row containing `reveal` to appear in the same section.
///
/// The wait polls the section at a fixed interval and never blocks the
/// thread; it suspends on the tokio timer between checks. There is no
/// explicit cancellation: once `timeout` elapses the wait is abandoned and
/// reported as [`ExpandError::Timeout`].
pub async fn expand_section(
    doc: &dyn DocumentAccessor,
    section: PageSection,
    trigger: &str,
    reveal: &str,
    timeout: Duration,
) -> Result<(), ExpandError> {
    let rows = doc.rows(section.selector());
    let row_index = rows
        .iter()
        .position(|row| row.contains(trigger))
        .ok_or_else(|| ExpandError::RowNotFound(trigger.to_string()))?;

    if !rows[row_index].has_expander {
        return Err(ExpandError::ControlNotFound(trigger.to_string()));
    }

    if let Err(why) = doc.activate_expander(section.selector(), row_index) {
        logging::warn_file_async(format!(
            "Failed to activate expand control for '{}' because: {:?}",
            trigger, why
        ));
        return Err(ExpandError::ControlNotFound(trigger.to_string()));
    }

    wait_for_row(doc, section, reveal, timeout).await
}

/// Polls `section` until a row containing `keyword` appears, checking
/// immediately and then every poll interval, bounded by `timeout` total
/// elapsed time. Each check is O(rows in section).
pub async fn wait_for_row(
    doc: &dyn DocumentAccessor,
    section: PageSection,
    keyword: &str,
    timeout: Duration,
) -> Result<(), ExpandError> {
    let interval = Duration::from_millis(SETTINGS.extractor.poll_interval_ms);
    let deadline = Instant::now() + timeout;

    loop {
        if doc
            .rows(section.selector())
            .iter()
            .any(|row| row.contains(keyword))
        {
            return Ok(());
        }

        if Instant::now() >= deadline {
            return Err(ExpandError::Timeout {
                keyword: keyword.to_string(),
                timeout,
            });
        }

        tokio::time::sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::memory::{MemoryDocument, MemorySection};

    fn section_with_hidden_row() -> MemorySection {
        MemorySection::new(&["", "2022", "2023"])
            .row("Sales", &["1,000", "1,100"])
            .expandable_row("Net Profit", &["80", "95"])
            .hidden_row("Profit for EPS", &["78", "92"])
    }

    #[tokio::test]
    async fn test_expand_reveals_hidden_row() {
        let doc = MemoryDocument::new("Acme")
            .with_section("#profit-loss", section_with_hidden_row());

        let result = expand_section(
            &doc,
            PageSection::ProfitLoss,
            "Net Profit",
            "Profit for EPS",
            Duration::from_secs(5),
        )
        .await;

        assert_eq!(result, Ok(()));
        assert!(doc
            .rows("#profit-loss")
            .iter()
            .any(|r| r.contains("Profit for EPS")));
    }

    #[tokio::test]
    async fn test_expand_waits_for_delayed_reveal() {
        let doc = MemoryDocument::new("Acme").with_section(
            "#profit-loss",
            section_with_hidden_row().reveal_delay(Duration::from_millis(600)),
        );

        let result = expand_section(
            &doc,
            PageSection::ProfitLoss,
            "Net Profit",
            "Profit for EPS",
            Duration::from_secs(5),
        )
        .await;

        assert_eq!(result, Ok(()));
    }

    #[tokio::test]
    async fn test_expand_row_not_found() {
        let doc = MemoryDocument::new("Acme").with_section(
            "#profit-loss",
            MemorySection::new(&["", "2023"]).row("Sales", &["1,100"]),
        );

        let result = expand_section(
            &doc,
            PageSection::ProfitLoss,
            "Net Profit",
            "Profit for EPS",
            Duration::from_secs(1),
        )
        .await;

        assert_eq!(
            result,
            Err(ExpandError::RowNotFound("Net Profit".to_string()))
        );
    }

    #[tokio::test]
    async fn test_expand_control_not_found() {
        let doc = MemoryDocument::new("Acme").with_section(
            "#profit-loss",
            MemorySection::new(&["", "2023"])
                .row("Sales", &["1,100"])
                .row("Net Profit", &["95"]),
        );

        let result = expand_section(
            &doc,
            PageSection::ProfitLoss,
            "Net Profit",
            "Profit for EPS",
            Duration::from_secs(1),
        )
        .await;

        assert_eq!(
            result,
            Err(ExpandError::ControlNotFound("Net Profit".to_string()))
        );
    }

    #[tokio::test]
    async fn test_wait_times_out_when_row_never_appears() {
        let doc = MemoryDocument::new("Acme").with_section(
            "#profit-loss",
            MemorySection::new(&["", "2023"])
                .expandable_row("Net Profit", &["95"]),
        );

        let timeout = Duration::from_millis(50);
        let result = expand_section(
            &doc,
            PageSection::ProfitLoss,
            "Net Profit",
            "Profit for EPS",
            timeout,
        )
        .await;

        assert_eq!(
            result,
            Err(ExpandError::Timeout {
                keyword: "Profit for EPS".to_string(),
                timeout,
            })
        );
    }
}
