//! Transaction id allocation and command request framing
//!
//! Standard operations take the running counter. Two deviations are required
//! by Nikon firmware:
//! - OpenSession always goes out with transaction id 0 and resets the
//!   counter to 1
//! - some vendor operations go out with fixed transaction ids, fixed
//!   frame lengths and fixed parameter words, looked up in [`VendorQuirks`]

use std::collections::HashMap;

use ptpip_types::codes::operation;
use tracing::{debug, warn};

use crate::message::{CommandRequest, DataPhase};

/// Per-operation compatibility table
///
/// Holds pinned transaction ids, fixed request frame lengths and the
/// parameter words sent when the caller passes none. The defaults
/// reproduce what Nikon bodies accept during pairing; other firmware may need
/// a different table or none at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorQuirks {
    pinned_transactions: HashMap<u16, u32>,
    frame_lengths: HashMap<u16, usize>,
    default_parameters: HashMap<u16, Vec<u32>>,
}

impl VendorQuirks {
    /// Empty table: every operation uses the running counter, no padding
    pub fn none() -> Self {
        Self {
            pinned_transactions: HashMap::new(),
            frame_lengths: HashMap::new(),
            default_parameters: HashMap::new(),
        }
    }

    /// Table observed from the Nikon reference app
    pub fn nikon() -> Self {
        Self::none()
            .with_pinned_transaction(operation::NIKON_DATA_COMMIT, 1)
            .with_pinned_transaction(operation::NIKON_DATA_FETCH_PRE, 1)
            .with_pinned_transaction(operation::NIKON_PIN_AUTH, 2)
            .with_frame_length(operation::NIKON_DATA_COMMIT, 30)
            .with_frame_length(operation::NIKON_DATA_FETCH_PRE, 18)
            .with_frame_length(operation::NIKON_PIN_AUTH, 22)
            // captured frame: 00 00 30 95 in the first slot
            .with_default_parameters(operation::NIKON_DATA_COMMIT, [0x9530_0000])
    }

    pub fn with_pinned_transaction(mut self, op_code: u16, transaction_id: u32) -> Self {
        self.pinned_transactions.insert(op_code, transaction_id);
        self
    }

    pub fn with_frame_length(mut self, op_code: u16, frame_length: usize) -> Self {
        self.frame_lengths.insert(op_code, frame_length);
        self
    }

    pub fn with_default_parameters(
        mut self,
        op_code: u16,
        parameters: impl IntoIterator<Item = u32>,
    ) -> Self {
        self.default_parameters
            .insert(op_code, parameters.into_iter().collect());
        self
    }

    pub fn pinned_transaction(&self, op_code: u16) -> Option<u32> {
        self.pinned_transactions.get(&op_code).copied()
    }

    pub fn frame_length(&self, op_code: u16) -> Option<usize> {
        self.frame_lengths.get(&op_code).copied()
    }

    pub fn default_parameters(&self, op_code: u16) -> Option<&[u32]> {
        self.default_parameters.get(&op_code).map(Vec::as_slice)
    }
}

impl Default for VendorQuirks {
    fn default() -> Self {
        Self::nikon()
    }
}

/// Transaction counter
///
/// Owned by the foreground flow; every issued request advances it by one.
#[derive(Debug, Clone)]
pub struct TransactionSequencer {
    counter: u32,
    quirks: VendorQuirks,
}

impl TransactionSequencer {
    pub fn new(quirks: VendorQuirks) -> Self {
        Self { counter: 0, quirks }
    }

    /// Value the next standard operation will use
    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn quirks(&self) -> &VendorQuirks {
        &self.quirks
    }

    /// Start over for a fresh connection
    pub fn reset(&mut self) {
        self.counter = 0;
    }

    fn advance(&mut self) -> u32 {
        let current = self.counter;
        // 0 is reserved for OpenSession
        self.counter = if current == u32::MAX { 1 } else { current + 1 };
        current
    }

    /// OpenSession with transaction id 0; later operations start at 1
    pub fn open_session(&mut self, session_id: u32) -> CommandRequest {
        self.counter = 1;
        CommandRequest::new(DataPhase::None, operation::OPEN_SESSION, 0).with_parameters([session_id])
    }

    /// Frame a request, honoring pinned ids, frame lengths and default parameters
    pub fn request(
        &mut self,
        data_phase: DataPhase,
        op_code: u16,
        parameters: impl IntoIterator<Item = u32>,
    ) -> CommandRequest {
        let running = self.advance();
        let transaction_id = match self.quirks.pinned_transaction(op_code) {
            Some(pinned) => {
                debug!(op_code, pinned, running, "Using pinned transaction id");
                pinned
            }
            None => running,
        };
        self.frame(CommandRequest::new(data_phase, op_code, transaction_id).with_parameters(parameters))
    }

    /// Frame a request on the running counter, ignoring pinned ids
    ///
    /// PIN submission shares its operation code with the approval request but
    /// not the approval's pinned id.
    pub fn sequential_request(
        &mut self,
        data_phase: DataPhase,
        op_code: u16,
        parameters: impl IntoIterator<Item = u32>,
    ) -> CommandRequest {
        let transaction_id = self.advance();
        self.frame(CommandRequest::new(data_phase, op_code, transaction_id).with_parameters(parameters))
    }

    fn frame(&self, mut request: CommandRequest) -> CommandRequest {
        if request.parameters.is_empty() {
            if let Some(defaults) = self.quirks.default_parameters(request.op_code) {
                request.parameters = defaults.to_vec();
            }
        }
        if request.exceeds_parameter_slots() {
            warn!(
                op_code = request.op_code,
                count = request.parameters.len(),
                "More parameters than the protocol defines"
            );
        }
        match self.quirks.frame_length(request.op_code) {
            Some(length) => request.padded_to(length),
            None => request,
        }
    }
}

impl Default for TransactionSequencer {
    fn default() -> Self {
        Self::new(VendorQuirks::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_standard_operations_use_counter() {
        let mut sequencer = TransactionSequencer::default();
        let first = sequencer.request(DataPhase::Receiving, operation::GET_DEVICE_INFO, []);
        let second = sequencer.request(DataPhase::Receiving, operation::GET_STORAGE_IDS, []);

        assert_eq!(first.transaction_id, 0);
        assert_eq!(second.transaction_id, 1);
        assert_eq!(sequencer.counter(), 2);
    }

    #[test]
    fn test_open_session() {
        let mut sequencer = TransactionSequencer::default();
        sequencer.request(DataPhase::Receiving, operation::GET_DEVICE_INFO, []);

        let open = sequencer.open_session(1);
        assert_eq!(open.transaction_id, 0);
        assert_eq!(open.parameters, vec![1]);
        assert_eq!(hex::encode(open.encode()), "16000000060000000000000002100000000001000000");
        assert_eq!(sequencer.counter(), 1);
    }

    #[test]
    fn test_pinned_vendor_operations() {
        let mut sequencer = TransactionSequencer::default();
        sequencer.open_session(1);
        for _ in 0..5 {
            sequencer.request(DataPhase::None, operation::CLOSE_SESSION, []);
        }

        let fetch = sequencer.request(DataPhase::Receiving, operation::NIKON_DATA_FETCH_PRE, []);
        assert_eq!(fetch.transaction_id, 1);
        assert_eq!(fetch.encode().len(), 18);

        let commit = sequencer.request(DataPhase::Receiving, operation::NIKON_DATA_COMMIT, []);
        assert_eq!(commit.transaction_id, 1);
        assert_eq!(commit.parameters, vec![0x9530_0000, 0, 0]);

        let approval = sequencer.request(DataPhase::Receiving, operation::NIKON_PIN_AUTH, [0x2001]);
        assert_eq!(approval.transaction_id, 2);
        assert_eq!(approval.encode().len(), 22);

        // pinned requests still advance the counter
        assert_eq!(sequencer.counter(), 9);
    }

    #[test]
    fn test_data_commit_matches_capture() {
        let mut sequencer = TransactionSequencer::default();
        sequencer.open_session(1);

        let commit = sequencer.request(DataPhase::Receiving, operation::NIKON_DATA_COMMIT, []);
        assert_eq!(
            hex::encode(commit.encode()),
            "1e00000006000000010000004c9401000000000030950000000000000000"
        );

        // explicit parameters replace the captured ones
        let custom = sequencer.request(DataPhase::Receiving, operation::NIKON_DATA_COMMIT, [7]);
        assert_eq!(custom.parameters, vec![7, 0, 0]);
    }

    #[test]
    fn test_pin_submission_ignores_pin_table() {
        let mut sequencer = TransactionSequencer::default();
        sequencer.request(DataPhase::Receiving, operation::GET_DEVICE_INFO, []);

        let pin = sequencer.sequential_request(DataPhase::None, operation::NIKON_PIN_AUTH, [1234]);
        assert_eq!(pin.transaction_id, 1);
        assert_eq!(pin.parameters, vec![1234]);
    }

    #[test]
    fn test_empty_quirks() {
        let mut sequencer = TransactionSequencer::new(VendorQuirks::none());
        sequencer.open_session(1);

        let commit = sequencer.request(DataPhase::Receiving, operation::NIKON_DATA_COMMIT, []);
        assert_eq!(commit.transaction_id, 1);
        assert!(commit.parameters.is_empty());
    }

    #[test]
    fn test_custom_quirks() {
        let quirks = VendorQuirks::none().with_pinned_transaction(0x9001, 42);
        assert_eq!(quirks.pinned_transaction(0x9001), Some(42));
        assert_eq!(quirks.frame_length(0x9001), None);
        assert_eq!(quirks.default_parameters(0x9001), None);

        let quirks = quirks.with_default_parameters(0x9001, [1, 2]);
        assert_eq!(quirks.default_parameters(0x9001), Some(&[1, 2][..]));
        assert_eq!(VendorQuirks::default(), VendorQuirks::nikon());
    }

    #[test]
    fn test_counter_wraps_past_zero() {
        let mut sequencer = TransactionSequencer::default();
        sequencer.counter = u32::MAX;

        let last = sequencer.request(DataPhase::None, operation::CLOSE_SESSION, []);
        assert_eq!(last.transaction_id, u32::MAX);
        assert_eq!(sequencer.counter(), 1);
    }

    #[test]
    fn test_reset() {
        let mut sequencer = TransactionSequencer::default();
        sequencer.open_session(1);
        sequencer.reset();
        assert_eq!(sequencer.counter(), 0);
    }

    proptest! {
        #[test]
        fn counter_is_one_after_open_session(prior in 0usize..64) {
            let mut sequencer = TransactionSequencer::default();
            for _ in 0..prior {
                sequencer.request(DataPhase::None, operation::GET_STORAGE_IDS, []);
            }

            sequencer.open_session(1);
            let next = sequencer.request(DataPhase::Receiving, operation::GET_STORAGE_IDS, []);
            prop_assert_eq!(next.transaction_id, 1);
        }
    }
}
