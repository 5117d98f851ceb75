use std::sync::Once;

static INIT: Once = Once::new();

/// 初始化测试日志，输出交给测试框架捕获
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}
