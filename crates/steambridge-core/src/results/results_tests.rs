#![allow(non_snake_case)]

use super::*;
use test_case::test_case;

fn put_u64(buf: &mut [u8], offset: usize, value: u64) {
    buf[offset..offset + 8].copy_from_slice(&value.to_ne_bytes());
}

fn put_i32(buf: &mut [u8], offset: usize, value: i32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_ne_bytes());
}

/// Pick the expected value for the target's callback packing
fn packed(pack8: usize, pack4: usize) -> usize {
    if CALLBACK_PACK == 8 { pack8 } else { pack4 }
}

#[test_case(ResultKind::UserStatsReceived, 24, 20)]
#[test_case(ResultKind::LeaderboardFindResult, 16, 12)]
#[test_case(ResultKind::LeaderboardScoresDownloaded, 24, 20)]
#[test_case(ResultKind::LeaderboardScoreUploaded, 32, 28)]
#[test_case(ResultKind::GlobalStatsReceived, 16, 12)]
fn ResultKind___size___matches_sdk_layout(kind: ResultKind, pack8: usize, pack4: usize) {
    assert_eq!(kind.size(), packed(pack8, pack4));
}

#[test_case(ResultKind::UserStatsReceived, 1101)]
#[test_case(ResultKind::LeaderboardFindResult, 1104)]
#[test_case(ResultKind::LeaderboardScoresDownloaded, 1105)]
#[test_case(ResultKind::LeaderboardScoreUploaded, 1106)]
#[test_case(ResultKind::GlobalStatsReceived, 1112)]
fn ResultKind___callback_id___matches_sdk(kind: ResultKind, id: i32) {
    assert_eq!(kind.callback_id(), id);
    assert_eq!(ResultKind::from_callback_id(id), Some(kind));
}

#[test]
fn ResultKind___from_callback_id___unknown_is_none() {
    assert_eq!(ResultKind::from_callback_id(1102), None);
}

#[test]
fn LeaderboardEntry___size___matches_sdk_layout() {
    assert_eq!(LeaderboardEntry::SIZE, packed(32, 28));
}

#[test]
fn LeaderboardFindResult___decode___reads_handle_and_found_flag() {
    let mut buf = vec![0u8; LeaderboardFindResult::SIZE];
    put_u64(&mut buf, 0, 0xDEAD_BEEF_0000_0001);
    buf[8] = 1;

    let record = LeaderboardFindResult::decode(&buf).unwrap();

    assert_eq!(record.leaderboard, LeaderboardHandle(0xDEAD_BEEF_0000_0001));
    assert!(record.found);
}

#[test]
fn LeaderboardScoresDownloaded___decode___reads_entries_and_count() {
    let mut buf = vec![0u8; LeaderboardScoresDownloaded::SIZE];
    put_u64(&mut buf, 0, 11);
    put_u64(&mut buf, 8, 22);
    put_i32(&mut buf, 16, 3);

    let record = LeaderboardScoresDownloaded::decode(&buf).unwrap();

    assert_eq!(record.leaderboard, LeaderboardHandle(11));
    assert_eq!(record.entries, LeaderboardEntriesHandle(22));
    assert_eq!(record.entry_count, 3);
}

#[test]
fn LeaderboardScoreUploaded___decode___honours_padding() {
    let mut buf = vec![0u8; LeaderboardScoreUploaded::SIZE];
    let leaderboard = packed(8, 4);
    buf[0] = 1;
    put_u64(&mut buf, leaderboard, 99);
    put_i32(&mut buf, leaderboard + 8, 1234);
    buf[leaderboard + 12] = 1;
    put_i32(&mut buf, leaderboard + 16, 5);
    put_i32(&mut buf, leaderboard + 20, 9);

    let record = LeaderboardScoreUploaded::decode(&buf).unwrap();

    assert_eq!(
        record,
        LeaderboardScoreUploaded {
            success: true,
            leaderboard: LeaderboardHandle(99),
            score: 1234,
            score_changed: true,
            global_rank_new: 5,
            global_rank_previous: 9,
        }
    );
}

#[test]
fn UserStatsReceived___decode___user_follows_padded_result() {
    let mut buf = vec![0u8; UserStatsReceived::SIZE];
    put_u64(&mut buf, 0, 480);
    put_i32(&mut buf, 8, 1);
    put_u64(&mut buf, packed(16, 12), 76561197960287930);

    let record = UserStatsReceived::decode(&buf).unwrap();

    assert_eq!(record.game_id, GameId(480));
    assert!(record.result.is_ok());
    assert_eq!(record.user, SteamId(76561197960287930));
}

#[test]
fn GlobalStatsReceived___decode___reads_result() {
    let mut buf = vec![0u8; GlobalStatsReceived::SIZE];
    put_u64(&mut buf, 0, 480);
    put_i32(&mut buf, 8, 2);

    let record = GlobalStatsReceived::decode(&buf).unwrap();

    assert_eq!(record.result, EResult::FAIL);
}

#[test]
fn LeaderboardEntry___encode___places_ugc_after_padding() {
    let entry = LeaderboardEntry {
        user: SteamId(1),
        global_rank: 2,
        score: 3,
        details_count: 4,
        ugc: UgcHandle(5),
    };

    let bytes = entry.encode();

    assert_eq!(bytes.len(), LeaderboardEntry::SIZE);
    assert_eq!(&bytes[16..20], &4i32.to_ne_bytes());
    let ugc = packed(24, 20);
    assert_eq!(&bytes[ugc..ugc + 8], &5u64.to_ne_bytes());
    assert_eq!(LeaderboardEntry::decode(&bytes).unwrap(), entry);
}

#[test]
fn LeaderboardScoreUploaded___encode___zeroes_padding() {
    let record = LeaderboardScoreUploaded {
        success: true,
        leaderboard: LeaderboardHandle(u64::MAX),
        ..Default::default()
    };

    let bytes = record.encode();

    assert!(bytes[1..packed(8, 4)].iter().all(|b| *b == 0));
}

#[test_case(ResultKind::UserStatsReceived)]
#[test_case(ResultKind::LeaderboardFindResult)]
#[test_case(ResultKind::LeaderboardScoresDownloaded)]
#[test_case(ResultKind::LeaderboardScoreUploaded)]
#[test_case(ResultKind::GlobalStatsReceived)]
fn CallResult___decode___short_buffer_fails(kind: ResultKind) {
    let buf = vec![0u8; kind.size() - 1];

    let result = CallResult::decode(kind, &buf);

    assert_eq!(
        result,
        Err(DecodeError::BufferTooShort {
            record: kind.struct_name(),
            expected: kind.size(),
            actual: kind.size() - 1,
        })
    );
}

#[test_case(ResultKind::UserStatsReceived)]
#[test_case(ResultKind::LeaderboardFindResult)]
#[test_case(ResultKind::LeaderboardScoresDownloaded)]
#[test_case(ResultKind::LeaderboardScoreUploaded)]
#[test_case(ResultKind::GlobalStatsReceived)]
fn CallResult___decode___produces_declared_kind(kind: ResultKind) {
    let buf = vec![0xFFu8; kind.size()];

    let result = CallResult::decode(kind, &buf).unwrap();

    assert_eq!(result.kind(), kind);
}

#[test]
fn CallbackRecord___from_result___rejects_other_variant() {
    let result = GlobalStatsReceived::default().into_result();

    assert!(LeaderboardFindResult::from_result(result).is_none());
    assert!(GlobalStatsReceived::from_result(result).is_some());
}
