#![allow(non_snake_case)]

use super::*;
use test_case::test_case;

#[test]
fn SteamApiCall___invalid___is_zero_and_not_valid() {
    assert_eq!(SteamApiCall::INVALID.raw(), 0);
    assert!(!SteamApiCall::INVALID.is_valid());
    assert!(SteamApiCall(7).is_valid());
}

#[test]
fn EResult___is_ok___only_for_one() {
    assert!(EResult(1).is_ok());
    assert!(!EResult::FAIL.is_ok());
    assert!(!EResult::default().is_ok());
}

#[test_case(-1, CallFailure::None)]
#[test_case(0, CallFailure::SteamGone)]
#[test_case(1, CallFailure::NetworkFailure)]
#[test_case(2, CallFailure::InvalidHandle)]
#[test_case(3, CallFailure::MismatchedCallback)]
#[test_case(42, CallFailure::Unknown(42))]
fn CallFailure___from_raw___maps_sdk_values(raw: i32, expected: CallFailure) {
    let failure = CallFailure::from_raw(raw);

    assert_eq!(failure, expected);
    assert_eq!(failure.to_raw(), raw);
}

#[test]
fn LeaderboardRequest___global___keeps_range() {
    let request = LeaderboardRequest::Global { start: 1, end: 10 };

    assert_eq!(request.data_request(), LeaderboardDataRequest::Global);
    assert_eq!(request.range(), (1, 10));
}

#[test]
fn LeaderboardRequest___users___maps_to_users_request_without_range() {
    let request = LeaderboardRequest::Users(vec![SteamId(5)]);

    assert_eq!(request.data_request(), LeaderboardDataRequest::Users);
    assert_eq!(request.range(), (0, 0));
}

#[test]
fn LeaderboardDataRequest___discriminants___match_sdk() {
    assert_eq!(LeaderboardDataRequest::Global as i32, 0);
    assert_eq!(LeaderboardDataRequest::GlobalAroundUser as i32, 1);
    assert_eq!(LeaderboardDataRequest::Friends as i32, 2);
    assert_eq!(LeaderboardDataRequest::Users as i32, 3);
}

#[test]
fn LeaderboardUploadScoreMethod___discriminants___match_sdk() {
    assert_eq!(LeaderboardUploadScoreMethod::KeepBest as i32, 1);
    assert_eq!(LeaderboardUploadScoreMethod::ForceUpdate as i32, 2);
}

#[test]
fn ScoreDetails___new___accepts_up_to_max() {
    let details = ScoreDetails::new(vec![1; MAX_SCORE_DETAILS]).unwrap();

    assert_eq!(details.len(), MAX_SCORE_DETAILS);
}

#[test]
fn ScoreDetails___new___rejects_above_max() {
    let result = ScoreDetails::new(vec![0; MAX_SCORE_DETAILS + 1]);

    assert!(matches!(
        result,
        Err(SteamError::TooManyDetails { count, max }) if count == MAX_SCORE_DETAILS + 1 && max == MAX_SCORE_DETAILS
    ));
}

#[test]
fn ScoreDetails___deserialize___enforces_bound() {
    let too_many = serde_json::to_vec(&vec![0; MAX_SCORE_DETAILS + 1]).unwrap();

    let result = serde_json::from_slice::<ScoreDetails>(&too_many);

    assert!(result.is_err());
}

#[test]
fn SteamId___serialize___is_transparent() {
    let json = serde_json::to_string(&SteamId(76561197960287930)).unwrap();

    assert_eq!(json, "76561197960287930");
}
