//! # Fragment Assembly
//!
//! AIS payloads longer than a single sentence are split over up to nine
//! sentences sharing a sequence id. [`FragmentGroup`] validates a set that was
//! already collected, [`FragmentAssembler`] collects fragments arriving one by
//! one, possibly out of order and from several threads.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError, RwLock},
    time::{Duration, Instant},
};

use tracing::{debug, warn};

use crate::{NmeaParseError, NmeaSentence};

/// Position of a sentence inside its fragment group.
pub trait Fragment {
    /// Sequence id shared by the fragments of a group, absent for single sentence payloads.
    fn sequence_id(&self) -> Option<u8>;

    /// Total number of fragments in the group.
    fn fragment_count(&self) -> u8;

    /// 1-based position of this fragment.
    fn fragment_number(&self) -> u8;
}

/// A complete, ordered set of sentences carrying one AIS payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentGroup {
    sentences: Vec<NmeaSentence>,
}

impl FragmentGroup {
    /// Validates and orders `sentences`.
    ///
    /// Fails when fragments are missing or duplicated, when their declared totals
    /// disagree, or when they carry different sequence ids.
    ///
    /// A fragment number given twice is an [`NmeaParseError::IncompleteGroup`] even when
    /// both copies are identical: the set must hold exactly one sentence per fragment.
    /// [`FragmentAssembler`] instead keeps the latest copy of a repeated fragment.
    ///
    /// ```rust
    /// use aivdm_parser::{FragmentGroup, NmeaSentence};
    ///
    /// let first = NmeaSentence::parse("!BSVDM,2,1,5,A,5:02Ih01WrRsEH57J20H5P8u8N222222222222167H66663k085QBS1H,0*55").unwrap();
    /// let second = NmeaSentence::parse("!BSVDM,2,2,5,A,888888888888880,2*38").unwrap();
    ///
    /// let group = FragmentGroup::new(vec![second, first]).unwrap();
    /// assert_eq!(group.sentences()[0].fragment_number(), 1);
    /// assert_eq!(group.fill_bits(), 2);
    /// ```
    pub fn new(sentences: Vec<NmeaSentence>) -> Result<Self, NmeaParseError> {
        Ok(Self {
            sentences: validate_group(sentences)?,
        })
    }

    pub fn sentences(&self) -> &[NmeaSentence] {
        &self.sentences
    }

    pub fn into_sentences(self) -> Vec<NmeaSentence> {
        self.sentences
    }

    /// Concatenation of the armored payloads in fragment order.
    pub fn payload(&self) -> String {
        self.sentences
            .iter()
            .map(NmeaSentence::payload)
            .collect()
    }

    /// Fill bits of the last fragment, the only ones that apply to the assembled payload.
    pub fn fill_bits(&self) -> u8 {
        self.sentences
            .last()
            .map(NmeaSentence::fill_bits)
            .unwrap_or_default()
    }
}

/// Sorts `fragments` by number and checks that they form exactly one complete group.
pub(crate) fn validate_group<T: Fragment>(mut fragments: Vec<T>) -> Result<Vec<T>, NmeaParseError> {
    let Some(first) = fragments.first() else {
        return Err(NmeaParseError::IncompleteGroup {
            sequence_id: None,
            expected: 1,
            received: 0,
        });
    };

    let sequence_id = first.sequence_id();
    let expected = first.fragment_count();

    for fragment in &fragments {
        if fragment.sequence_id() != sequence_id {
            return Err(NmeaParseError::MixedSequences);
        }
        if fragment.fragment_count() != expected {
            return Err(NmeaParseError::FragmentCountMismatch {
                sequence_id,
                expected,
                found: fragment.fragment_count(),
            });
        }
    }

    fragments.sort_by_key(Fragment::fragment_number);

    let complete = fragments.len() == expected as usize
        && fragments
            .iter()
            .zip(1..)
            .all(|(fragment, number)| fragment.fragment_number() == number);

    if !complete {
        return Err(NmeaParseError::IncompleteGroup {
            sequence_id,
            expected,
            received: fragments.len(),
        });
    }

    Ok(fragments)
}

struct Builder<T> {
    total: u8,
    fragments: Vec<Option<T>>,
    created: Instant,
    /// Set once the group completed or was discarded. Writers that still hold the
    /// builder must start over with a fresh one.
    closed: bool,
}

impl<T> Builder<T> {
    fn new(total: u8) -> Self {
        Self {
            total,
            fragments: std::iter::repeat_with(|| None).take(total as usize).collect(),
            created: Instant::now(),
            closed: false,
        }
    }

    fn is_complete(&self) -> bool {
        self.fragments.iter().all(Option::is_some)
    }

    fn take(&mut self) -> Vec<T> {
        self.fragments.drain(..).flatten().collect()
    }
}

/// Collects multi-sentence payloads keyed by sequence id.
///
/// Single-fragment sentences are returned immediately. Fragments of a larger group are
/// buffered until every fragment number is present; the complete group is then returned
/// in fragment order and its buffer is dropped. A fragment arriving twice replaces the
/// earlier copy.
///
/// Groups for different sequence ids are independent: the assembler can be shared between
/// threads and fragments of unrelated groups never wait on each other.
///
/// Groups that never complete stay buffered until [`discard`](Self::discard) or
/// [`discard_older_than`](Self::discard_older_than) is called.
///
/// ```rust
/// use aivdm_parser::{FragmentAssembler, NmeaSentence};
///
/// let assembler = FragmentAssembler::new();
///
/// let second = NmeaSentence::parse("!BSVDM,2,2,5,A,888888888888880,2*38").unwrap();
/// assert_eq!(assembler.accept(second).unwrap(), None);
/// assert_eq!(assembler.pending(), 1);
///
/// let first = NmeaSentence::parse("!BSVDM,2,1,5,A,5:02Ih01WrRsEH57J20H5P8u8N222222222222167H66663k085QBS1H,0*55").unwrap();
/// let group = assembler.accept(first).unwrap().unwrap();
/// assert_eq!(group.len(), 2);
/// assert_eq!(assembler.pending(), 0);
/// ```
pub struct FragmentAssembler<T = NmeaSentence> {
    groups: RwLock<HashMap<u8, Arc<Mutex<Builder<T>>>>>,
}

impl<T: Fragment> FragmentAssembler<T> {
    pub fn new() -> Self {
        Self {
            groups: RwLock::new(HashMap::new()),
        }
    }

    /// Adds a fragment, returning the complete group once its last fragment arrived.
    ///
    /// A fragment whose total disagrees with the buffered group discards that group and
    /// fails with [`NmeaParseError::FragmentCountMismatch`].
    pub fn accept(&self, fragment: T) -> Result<Option<Vec<T>>, NmeaParseError> {
        let total = fragment.fragment_count();
        let number = fragment.fragment_number();

        if total <= 1 {
            return Ok(Some(vec![fragment]));
        }

        let Some(sequence_id) = fragment.sequence_id() else {
            return Err(NmeaParseError::InvalidField {
                field: "sequence_id",
                value: String::new(),
            });
        };

        if number == 0 || number > total {
            return Err(NmeaParseError::InvalidField {
                field: "fragment_number",
                value: number.to_string(),
            });
        }

        loop {
            let builder = self.builder(sequence_id, total);
            let mut guard = builder.lock().unwrap_or_else(PoisonError::into_inner);

            if guard.closed {
                // Lost a race with a writer that completed or discarded this group.
                continue;
            }

            if guard.total != total {
                let expected = guard.total;
                guard.closed = true;
                drop(guard);
                self.remove(sequence_id, &builder);

                warn!(sequence_id, expected, found = total, "fragment count mismatch, group discarded");
                return Err(NmeaParseError::FragmentCountMismatch {
                    sequence_id: Some(sequence_id),
                    expected,
                    found: total,
                });
            }

            let slot = &mut guard.fragments[number as usize - 1];
            if slot.is_some() {
                debug!(sequence_id, number, "duplicate fragment replaces the buffered one");
            }
            *slot = Some(fragment);

            if !guard.is_complete() {
                return Ok(None);
            }

            guard.closed = true;
            let fragments = guard.take();
            drop(guard);
            self.remove(sequence_id, &builder);

            debug!(sequence_id, total, "fragment group complete");
            return Ok(Some(fragments));
        }
    }

    /// Number of groups waiting for more fragments.
    pub fn pending(&self) -> usize {
        self.groups
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Drops the buffered group for `sequence_id`, returning whether one existed.
    pub fn discard(&self, sequence_id: u8) -> bool {
        let removed = self
            .groups
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&sequence_id);

        match removed {
            Some(builder) => {
                builder
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .closed = true;
                true
            }
            None => false,
        }
    }

    /// Drops every group whose first fragment arrived more than `age` ago.
    ///
    /// Returns the number of discarded groups.
    pub fn discard_older_than(&self, age: Duration) -> usize {
        let mut groups = self.groups.write().unwrap_or_else(PoisonError::into_inner);
        let before = groups.len();

        groups.retain(|sequence_id, builder| {
            let mut builder = builder.lock().unwrap_or_else(PoisonError::into_inner);
            if builder.created.elapsed() <= age {
                return true;
            }

            debug!(sequence_id, "stale fragment group discarded");
            builder.closed = true;
            false
        });

        before - groups.len()
    }

    fn builder(&self, sequence_id: u8, total: u8) -> Arc<Mutex<Builder<T>>> {
        if let Some(builder) = self
            .groups
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&sequence_id)
        {
            return Arc::clone(builder);
        }

        let mut groups = self.groups.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            groups
                .entry(sequence_id)
                .or_insert_with(|| Arc::new(Mutex::new(Builder::new(total)))),
        )
    }

    fn remove(&self, sequence_id: u8, builder: &Arc<Mutex<Builder<T>>>) {
        let mut groups = self.groups.write().unwrap_or_else(PoisonError::into_inner);
        if groups
            .get(&sequence_id)
            .is_some_and(|current| Arc::ptr_eq(current, builder))
        {
            groups.remove(&sequence_id);
        }
    }
}

impl<T: Fragment> Default for FragmentAssembler<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIRST: &str =
        "!BSVDM,2,1,5,A,5:02Ih01WrRsEH57J20H5P8u8N222222222222167H66663k085QBS1H,0*55";
    const SECOND: &str = "!BSVDM,2,2,5,A,888888888888880,2*38";

    fn sentence(raw: &str) -> NmeaSentence {
        NmeaSentence::parse(raw).unwrap()
    }

    #[test]
    fn test_group_ordering() {
        let group = FragmentGroup::new(vec![sentence(SECOND), sentence(FIRST)]).unwrap();
        let raw: Vec<_> = group
            .sentences()
            .iter()
            .map(NmeaSentence::raw_message)
            .collect();
        assert_eq!(raw, [FIRST, SECOND]);
        assert_eq!(
            group.payload(),
            "5:02Ih01WrRsEH57J20H5P8u8N222222222222167H66663k085QBS1H888888888888880"
        );
    }

    #[test]
    fn test_group_errors() {
        assert!(matches!(
            FragmentGroup::new(vec![]),
            Err(NmeaParseError::IncompleteGroup { received: 0, .. })
        ));
        assert_eq!(
            FragmentGroup::new(vec![sentence(FIRST)]),
            Err(NmeaParseError::IncompleteGroup {
                sequence_id: Some(5),
                expected: 2,
                received: 1
            })
        );
        assert_eq!(
            FragmentGroup::new(vec![sentence(FIRST), sentence(FIRST)]),
            Err(NmeaParseError::IncompleteGroup {
                sequence_id: Some(5),
                expected: 2,
                received: 2
            })
        );
        assert_eq!(
            FragmentGroup::new(vec![sentence(FIRST), sentence(SECOND), sentence(SECOND)]),
            Err(NmeaParseError::IncompleteGroup {
                sequence_id: Some(5),
                expected: 2,
                received: 3
            })
        );
        assert_eq!(
            FragmentGroup::new(vec![
                sentence(FIRST),
                sentence("!AIVDM,1,1,,B,00,4*21")
            ]),
            Err(NmeaParseError::MixedSequences)
        );
    }

    #[test]
    fn test_assembler_single_fragment() {
        let assembler = FragmentAssembler::new();
        let group = assembler
            .accept(sentence("!AIVDM,1,1,,B,00,4*21"))
            .unwrap()
            .unwrap();
        assert_eq!(group.len(), 1);
        assert_eq!(assembler.pending(), 0);
    }

    #[test]
    fn test_assembler_out_of_order() {
        let assembler = FragmentAssembler::new();
        assert_eq!(assembler.accept(sentence(SECOND)).unwrap(), None);
        let group = assembler.accept(sentence(FIRST)).unwrap().unwrap();
        assert_eq!(group[0].raw_message(), FIRST);
        assert_eq!(group[1].raw_message(), SECOND);
        assert_eq!(assembler.pending(), 0);
    }

    #[test]
    fn test_assembler_duplicate_fragment() {
        let assembler = FragmentAssembler::new();
        assert_eq!(assembler.accept(sentence(FIRST)).unwrap(), None);
        assert_eq!(assembler.accept(sentence(FIRST)).unwrap(), None);
        assert_eq!(assembler.pending(), 1);
        assert!(assembler.accept(sentence(SECOND)).unwrap().is_some());
    }

    struct TestFragment {
        sequence_id: u8,
        total: u8,
        number: u8,
    }

    impl Fragment for TestFragment {
        fn sequence_id(&self) -> Option<u8> {
            Some(self.sequence_id)
        }

        fn fragment_count(&self) -> u8 {
            self.total
        }

        fn fragment_number(&self) -> u8 {
            self.number
        }
    }

    fn fragment(sequence_id: u8, total: u8, number: u8) -> TestFragment {
        TestFragment {
            sequence_id,
            total,
            number,
        }
    }

    #[test]
    fn test_assembler_count_mismatch() {
        let assembler = FragmentAssembler::new();
        assert!(assembler.accept(fragment(3, 3, 1)).unwrap().is_none());

        let result = assembler.accept(fragment(3, 2, 2));
        assert_eq!(
            result.err(),
            Some(NmeaParseError::FragmentCountMismatch {
                sequence_id: Some(3),
                expected: 3,
                found: 2
            })
        );
        assert_eq!(assembler.pending(), 0);

        // The sequence id is free again.
        assert!(assembler.accept(fragment(3, 2, 2)).unwrap().is_none());
        let group = assembler.accept(fragment(3, 2, 1)).unwrap().unwrap();
        assert_eq!(group.len(), 2);
    }

    #[test]
    fn test_assembler_discard() {
        let assembler = FragmentAssembler::new();
        assembler.accept(fragment(1, 2, 1)).unwrap();
        assembler.accept(fragment(2, 2, 1)).unwrap();
        assert_eq!(assembler.pending(), 2);

        assert!(assembler.discard(1));
        assert!(!assembler.discard(1));
        assert_eq!(assembler.pending(), 1);

        assert_eq!(assembler.discard_older_than(Duration::from_secs(3600)), 0);
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(assembler.discard_older_than(Duration::ZERO), 1);
        assert_eq!(assembler.pending(), 0);
    }

    #[test]
    fn test_assembler_concurrent_groups() {
        let assembler = FragmentAssembler::new();
        let completed = std::sync::atomic::AtomicUsize::new(0);

        std::thread::scope(|scope| {
            for sequence_id in 0..8u8 {
                for number in (1..=4u8).rev() {
                    let assembler = &assembler;
                    let completed = &completed;
                    scope.spawn(move || {
                        if let Some(group) = assembler
                            .accept(fragment(sequence_id, 4, number))
                            .unwrap()
                        {
                            let numbers: Vec<_> =
                                group.iter().map(|fragment| fragment.number).collect();
                            assert_eq!(numbers, [1, 2, 3, 4]);
                            assert!(group.iter().all(|f| f.sequence_id == sequence_id));
                            completed.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                        }
                    });
                }
            }
        });

        assert_eq!(completed.into_inner(), 8);
        assert_eq!(assembler.pending(), 0);
    }

    #[test]
    fn test_assembler_concurrent_duplicates() {
        const TOTAL: u8 = 9;
        const COPIES: usize = 3;

        let assembler = FragmentAssembler::new();

        for _ in 0..20 {
            let completed = Mutex::new(Vec::new());
            let deliver = |number: u8| {
                if let Some(group) = assembler.accept(fragment(7, TOTAL, number)).unwrap() {
                    completed.lock().unwrap().push(group);
                }
            };

            // Every fragment but the last, each delivered by several threads at once.
            let barrier = std::sync::Barrier::new((TOTAL as usize - 1) * COPIES);
            std::thread::scope(|scope| {
                for number in 1..TOTAL {
                    for _ in 0..COPIES {
                        let barrier = &barrier;
                        let deliver = &deliver;
                        scope.spawn(move || {
                            barrier.wait();
                            deliver(number);
                        });
                    }
                }
            });
            assert!(completed.lock().unwrap().is_empty());
            assert_eq!(assembler.pending(), 1);

            std::thread::scope(|scope| {
                scope.spawn(|| deliver(TOTAL));
            });

            let completed = completed.into_inner().unwrap();
            assert_eq!(completed.len(), 1);
            let numbers: Vec<_> = completed[0].iter().map(|fragment| fragment.number).collect();
            assert_eq!(numbers, (1..=TOTAL).collect::<Vec<_>>());
            assert_eq!(assembler.pending(), 0);
        }
    }
}
