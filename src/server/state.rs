use crate::target::{NominatimReverse, TargetSelector};

pub struct AppState {
    pub selector: TargetSelector<NominatimReverse>,
}
