use iopmp_core::gate::{Response, Transaction};
use iopmp_core::soc::Downstream;
use mockall::mock;

mock! {
    pub Target {}
    impl Downstream for Target {
        fn issue(&mut self, txn: &Transaction) -> Response;
    }
}

/// A target that must never be reached.
pub fn untouchable_target() -> MockTarget {
    let mut target = MockTarget::new();
    let _ = target.expect_issue().never();
    target
}

/// A target that answers every transaction with `response`, exactly `times` times.
pub fn answering_target(response: Response, times: usize) -> MockTarget {
    let mut target = MockTarget::new();
    let _ = target
        .expect_issue()
        .times(times)
        .returning(move |_| response.clone());
    target
}
