use super::*;

#[test]
fn conflict_wins_over_other_markers() {
    let err = ApiError::operation_failed("backend returned 409 Conflict: Not Found in body");
    assert_eq!(err.code, ErrorCode::Conflict);
    assert_eq!(err.message, "操作失败：资源冲突（名称可能已存在）");
}

#[test]
fn bad_request_and_not_found_are_classified() {
    assert_eq!(
        ApiError::operation_failed("backend returned 400 Bad Request").message,
        "操作失败：请求参数无效"
    );
    assert_eq!(
        ApiError::operation_failed("backend returned 404 Not Found").message,
        "操作失败：资源未找到"
    );
}

#[test]
fn other_failures_keep_detail() {
    let err = ApiError::operation_failed("connection refused");
    assert_eq!(err.code, ErrorCode::Internal);
    assert_eq!(err.message, "操作失败：connection refused");
}

#[test]
fn display_includes_code_and_message() {
    let err = ApiError::new(ErrorCode::Validation, "标题不能为空");
    assert_eq!(err.to_string(), "Validation: 标题不能为空");
}
