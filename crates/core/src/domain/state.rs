use crate::domain::hotel::HotelsResponse;
use crate::domain::request::TravelRequest;
use crate::errors::PlanError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlowPhase {
    Pending,
    Complete,
    Failed(PlanError),
}

impl FlowPhase {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Request fields threaded through the single planning step, plus the
/// response once the step completes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionState {
    request: TravelRequest,
    hotels: Option<HotelsResponse>,
    phase: FlowPhase,
}

impl ExecutionState {
    pub fn pending(request: TravelRequest) -> Self {
        Self { request, hotels: None, phase: FlowPhase::Pending }
    }

    pub fn request(&self) -> &TravelRequest {
        &self.request
    }

    pub fn hotels(&self) -> Option<&HotelsResponse> {
        self.hotels.as_ref()
    }

    pub fn phase(&self) -> &FlowPhase {
        &self.phase
    }

    /// Attaches the response. Only a pending state can complete.
    pub fn complete(self, hotels: HotelsResponse) -> Self {
        match self.phase {
            FlowPhase::Pending => {
                Self { request: self.request, hotels: Some(hotels), phase: FlowPhase::Complete }
            }
            _ => self,
        }
    }

    /// Marks the step failed. Only a pending state can fail.
    pub fn fail(self, error: PlanError) -> Self {
        match self.phase {
            FlowPhase::Pending => {
                Self { request: self.request, hotels: None, phase: FlowPhase::Failed(error) }
            }
            _ => self,
        }
    }

    pub fn into_result(self) -> Result<Self, PlanError> {
        match self.phase {
            FlowPhase::Failed(error) => Err(error),
            _ => Ok(self),
        }
    }

    pub fn into_hotels(self) -> Option<HotelsResponse> {
        self.hotels
    }
}
