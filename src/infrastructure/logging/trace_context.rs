/// 리포트 실행 단위의 Trace ID 생성
pub struct TraceContext;

impl TraceContext {
    /// 새 Trace ID 생성 (UUID v4)
    pub fn new_trace_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// 로그 한 줄에 담기 좋은 짧은 형태 (앞 8자리)
    pub fn short(trace_id: &str) -> &str {
        trace_id.get(..8).unwrap_or(trace_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trace_id() {
        let id1 = TraceContext::new_trace_id();
        let id2 = TraceContext::new_trace_id();

        assert_ne!(id1, id2);
        assert_eq!(id1.len(), 36);
        assert!(id1.contains('-'));
    }

    #[test]
    fn test_short() {
        assert_eq!(TraceContext::short("0123456789abcdef"), "01234567");
        assert_eq!(TraceContext::short("abc"), "abc");
    }
}
