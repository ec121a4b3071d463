use crate::agent::AgentInfo;
use crate::extract::ListingRecord;
use crate::state::ListingStage;
use crate::ScrapeError;

/// Per-listing pipeline state
///
/// A context is created when a detail link is discovered and travels with
/// that listing's task through the detail fetch and the agent lookup. It is
/// never shared between listings. [`ListingContext::emit`] consumes the
/// context, so a record leaves the pipeline at most once.
#[derive(Debug, Clone)]
pub struct ListingContext {
    url: String,
    stage: ListingStage,
    record: ListingRecord,
    /// Page-scoped token authorizing the agent lookup; `None` when the
    /// listing has no agent stage
    agent_token: Option<String>,
}

impl ListingContext {
    /// Creates a context for a freshly discovered detail link
    pub fn discovered(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            record: ListingRecord::new(url.clone()),
            url,
            stage: ListingStage::Discovered,
            agent_token: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn stage(&self) -> ListingStage {
        self.stage
    }

    pub fn record(&self) -> &ListingRecord {
        &self.record
    }

    pub fn agent_token(&self) -> Option<&str> {
        self.agent_token.as_deref()
    }

    /// Stores the extracted record; a token means an agent lookup must follow
    pub fn detail_fetched(
        &mut self,
        record: ListingRecord,
        agent_token: Option<String>,
    ) -> Result<(), ScrapeError> {
        self.transition(ListingStage::DetailFetched)?;
        self.record = record;
        self.agent_token = agent_token;
        Ok(())
    }

    /// Returns true while an agent lookup is still owed
    pub fn needs_agent_lookup(&self) -> bool {
        self.stage == ListingStage::DetailFetched && self.agent_token.is_some()
    }

    /// Merges a successful agent lookup into the record
    pub fn agent_fetched(&mut self, info: AgentInfo) -> Result<(), ScrapeError> {
        self.transition(ListingStage::AgentFetched)?;
        info.merge_into(&mut self.record);
        Ok(())
    }

    /// Resolves a failed agent lookup; agent fields stay empty
    pub fn agent_failed(&mut self) -> Result<(), ScrapeError> {
        self.transition(ListingStage::AgentFetched)
    }

    /// Whether every stage this listing needs has finished
    pub fn is_ready(&self) -> bool {
        match self.stage {
            ListingStage::AgentFetched => true,
            ListingStage::DetailFetched => self.agent_token.is_none(),
            _ => false,
        }
    }

    /// Hands the completed record out of the pipeline
    ///
    /// # Returns
    ///
    /// * `Ok(ListingRecord)` - The finished record
    /// * `Err(ScrapeError::InvalidTransition)` - The listing is not complete yet
    pub fn emit(mut self) -> Result<ListingRecord, ScrapeError> {
        if !self.is_ready() {
            return Err(ScrapeError::InvalidTransition {
                from: self.stage,
                to: ListingStage::Emitted,
            });
        }
        self.transition(ListingStage::Emitted)?;
        Ok(self.record)
    }

    fn transition(&mut self, next: ListingStage) -> Result<(), ScrapeError> {
        if !self.stage.can_transition_to(next) {
            return Err(ScrapeError::InvalidTransition {
                from: self.stage,
                to: next,
            });
        }
        tracing::debug!("{}: {} -> {}", self.url, self.stage, next);
        self.stage = next;
        Ok(())
    }
}
