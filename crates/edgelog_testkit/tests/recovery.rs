//! End-to-end recovery scenarios: format, append, damage, replay.

use edgelog_core::layout::{LOG_BLOCK_SIZE, SUPERBLOCK_SIZE};
use edgelog_core::{
    checksum, BlockRejection, CheckpointCoordinator, Config, CoreError, Generation,
    LogEntryBlock, ReplayStop, SuperblockStore,
};
use edgelog_storage::{Device, InMemoryDevice};
use edgelog_testkit::prelude::*;
use proptest::prelude::*;

// =============================================================================
// Format
// =============================================================================

#[test]
fn zeroed_superblock_formats_to_defaults() {
    let mut device = InMemoryDevice::new(11 * LOG_BLOCK_SIZE);
    let store = SuperblockStore::default();

    let before = store.load(&device).unwrap();
    assert!(!store.validate(&before));

    let sb = store.format(&mut device).unwrap();
    assert_eq!(sb.generation, Generation::INITIAL);
    assert_eq!(sb.log_start, 1);
    assert_eq!(sb.log_size, 10);

    let bytes = device.read_at(0, SUPERBLOCK_SIZE).unwrap();
    let stored = checksum::stored(&bytes).unwrap();
    assert!(checksum::validate(&bytes, SUPERBLOCK_SIZE, stored).unwrap());
}

#[test]
fn repeated_format_only_advances_generation() {
    let mut journal = TestJournal::new(11);
    let first = journal.superblock;

    for expected in 1..=5u32 {
        let sb = journal.checkpoint();
        assert_eq!(sb.generation, Generation::new(expected));
        assert_eq!(sb.log_start, first.log_start);
        assert_eq!(sb.log_size, first.log_size);
    }
}

#[test]
fn replay_on_unformatted_device_is_fatal() {
    let device = InMemoryDevice::new(4 * LOG_BLOCK_SIZE);
    let result = CheckpointCoordinator::default().replay(&device);
    assert!(matches!(result, Err(CoreError::CorruptSuperblock { .. })));
}

#[test]
fn replay_after_superblock_damage_is_fatal() {
    let mut journal = TestJournal::new(4);
    journal.append_block(&sample_entries(0, 5));

    journal.device.write_at(9, &[0x40]).unwrap();

    let result = journal.coordinator.replay(&journal.device);
    assert!(matches!(result, Err(CoreError::CorruptSuperblock { .. })));
}

// =============================================================================
// Replay
// =============================================================================

#[test]
fn corrupted_middle_block_truncates_history() {
    let mut journal = TestJournal::new(11);
    let mut expected = Vec::new();
    for block in 0..10 {
        let written = journal.append_block(&sample_entries(block, 12));
        if block < 5 {
            expected.extend(written);
        }
    }
    let fifth = journal.superblock.log_start + 5;

    damage_block(&mut journal.device, fifth, &Damage::ClobberChecksum);
    let replay = journal.replay_with_report();

    assert_eq!(replay.entries, expected);
    assert_eq!(replay.report.blocks_valid, 5);
    assert!(matches!(
        replay.report.stop,
        ReplayStop::Rejected {
            reason: BlockRejection::ChecksumMismatch { .. },
            ..
        }
    ));
}

#[test]
fn torn_tail_write_is_discarded() {
    let mut journal = TestJournal::new(6);
    let durable = journal.append_blocks(&[sample_entries(0, 50), sample_entries(1, 50)]);

    let mut pending =
        LogEntryBlock::with_entries(journal.superblock.generation, &sample_entries(2, 120))
            .unwrap();
    pending.seal();
    let tail = journal.next_block();
    damage_block(
        &mut journal.device,
        tail,
        &Damage::TornWrite {
            replacement: Box::new(pending),
            written: LOG_BLOCK_SIZE / 2,
        },
    );

    let replay = journal.replay_with_report();
    assert_eq!(replay.entries, durable);
    assert!(matches!(
        replay.report.stop,
        ReplayStop::Rejected {
            index,
            reason: BlockRejection::ChecksumMismatch { .. },
        } if index == tail
    ));
}

#[test]
fn checkpoint_discards_previous_epoch() {
    let mut journal = TestJournal::new(8);
    journal.append_blocks(&[sample_entries(0, 3), sample_entries(1, 3)]);

    journal.checkpoint();

    assert!(journal.replay().is_empty());
}

#[test]
fn new_epoch_overwrites_prefix_of_old_epoch() {
    let mut journal = TestJournal::new(8);
    journal.append_blocks(&[
        sample_entries(0, 3),
        sample_entries(1, 3),
        sample_entries(2, 3),
    ]);

    journal.checkpoint();
    let current = journal.append_block(&sample_entries(7, 9));

    let replay = journal.replay_with_report();
    assert_eq!(replay.entries, current);
    assert_eq!(
        replay.report.stop,
        ReplayStop::Rejected {
            index: journal.superblock.log_start + 1,
            reason: BlockRejection::StaleGeneration {
                expected: 1,
                found: 0
            },
        }
    );
}

#[test]
fn oversized_block_store_leaves_device_unchanged() {
    let mut journal = TestJournal::new(4);
    journal.append_block(&sample_entries(0, 4));
    let before = journal.device.data();

    let mut raw = [0u8; LOG_BLOCK_SIZE];
    raw[12..16].copy_from_slice(&200u32.to_le_bytes());
    let mut block = LogEntryBlock::from_bytes(&raw).unwrap();

    let result = journal
        .coordinator
        .block_store()
        .store(&mut journal.device, 1, &mut block);

    assert!(matches!(result, Err(CoreError::Bounds { .. })));
    assert_eq!(journal.device.data(), before);
}

#[test]
fn full_blocks_replay_in_order() {
    let mut journal = TestJournal::new(5);
    let written = journal.append_blocks(&[
        sample_entries(0, 199),
        sample_entries(1, 199),
        sample_entries(2, 199),
        sample_entries(3, 199),
    ]);

    let replay = journal.replay_with_report();
    assert_eq!(replay.entries, written);
    assert_eq!(replay.report.stop, ReplayStop::RegionExhausted);
}

// =============================================================================
// File devices
// =============================================================================

#[test]
fn file_journal_survives_reopen() {
    let image = FileJournal::new(6);

    let written = {
        let mut journal = TestJournal::format(image.open(), Config::default());
        journal.append_blocks(&[sample_entries(0, 10), sample_entries(1, 20)])
    };

    let device = image.open();
    let entries = CheckpointCoordinator::default().replay(&device).unwrap();
    assert_eq!(entries, written);
}

#[test]
fn file_journal_reformat_across_reopen() {
    let image = FileJournal::new(6);
    {
        let mut device = image.open();
        CheckpointCoordinator::default()
            .initialize(&mut device)
            .unwrap();
    }

    let mut device = image.open();
    let sb = CheckpointCoordinator::default()
        .initialize(&mut device)
        .unwrap();
    assert_eq!(sb.generation, Generation::new(1));
    assert_eq!(sb.log_size, 5);
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(recovery_config())]

    #[test]
    fn replay_returns_everything_written(log in log_strategy(6)) {
        let mut journal = TestJournal::new(8);
        let written = journal.append_blocks(&log);
        prop_assert_eq!(journal.replay(), written);
    }

    #[test]
    fn replay_stops_before_first_damaged_block(
        log in log_strategy(6),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut journal = TestJournal::new(8);
        journal.append_blocks(&log);
        let damaged = pick.index(log.len());

        let index = journal.superblock.log_start + damaged as u32;
        damage_block(&mut journal.device, index, &Damage::ClobberChecksum);

        let expected: Vec<_> = log[..damaged].iter().flatten().copied().collect();
        prop_assert_eq!(journal.replay(), expected);
    }

    #[test]
    fn single_bit_flip_in_block_is_detected(
        entries in block_entries_strategy(),
        offset in 8usize..LOG_BLOCK_SIZE,
        bit in 0u8..8,
    ) {
        let mut journal = TestJournal::new(3);
        journal.append_block(&entries);
        let index = journal.superblock.log_start;

        damage_block(&mut journal.device, index, &Damage::FlipBit { offset, bit });

        let block = journal.coordinator.block_store().load(&journal.device, index).unwrap();
        prop_assert!(!block.is_current(journal.superblock.generation));
    }
}
