//! ユースケースのシナリオテスト（ManualClock + インメモリストア + 記録用 observer）

mod support;
