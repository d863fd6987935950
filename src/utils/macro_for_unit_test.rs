/// 错误断言宏 - 灵活粒度验证 Result 错误
///
/// # 用法
/// - `assert_err!(expr)`：只验证是 Err
/// - `assert_err!(expr, Variant(_))`：验证错误类型
/// - `assert_err!(expr, Pattern(msg) if condition)`：验证类型 + 条件
///
/// # 示例
/// ```ignore
/// // 只验证是错误
/// assert_err!(result);
///
/// // 验证错误类型
/// assert_err!(result, ModelError::TrainingTerminated);
///
/// // 验证消息包含关键词
/// assert_err!(result, ModelError::CorruptOrIncompatibleState(msg) if msg.contains("W2"));
/// ```
#[macro_export]
macro_rules! assert_err {
    // 只验证是 Err
    ($expr:expr) => {
        assert!($expr.is_err(), "预期 Err，实际得到 Ok");
    };
    // 通用模式匹配（带 if guard 或复杂 pattern）
    ($expr:expr, $($pattern:tt)+) => {
        match &$expr {
            Err(e) => assert!(
                matches!(e, $($pattern)+),
                "错误类型不匹配：预期 `{}`，实际得到 `{:?}`",
                stringify!($($pattern)+),
                e
            ),
            Ok(_) => panic!(
                "预期 Err 匹配 `{}`，实际得到 Ok",
                stringify!($($pattern)+)
            ),
        }
    };
}

/// panic断言宏，可选地校验panic消息是否包含给定片段
#[macro_export]
macro_rules! assert_panic {
    ($expr:expr) => {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| $expr)) {
            Ok(_) => panic!("表达式没有触发panic"),
            Err(_) => (),
        }
    };
    ($expr:expr, $expected_fragment:expr) => {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| $expr)) {
            Ok(_) => panic!("表达式没有触发panic"),
            Err(err) => {
                let expected = $expected_fragment.to_string();
                let actual = if let Some(msg) = err.downcast_ref::<&'static str>() {
                    msg.to_string()
                } else if let Some(msg) = err.downcast_ref::<String>() {
                    msg.clone()
                } else {
                    panic!("未找到panic消息，预期包含: {}", expected);
                };
                assert!(
                    actual.contains(&expected),
                    "panic消息与预期不符：`{}` 不包含 `{}`",
                    actual,
                    expected
                );
            }
        }
    };
}
