//! Fixed route table.

/// The endpoints served by the exporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Ping,
    Metrics,
    GcStats,
    Threads,
}

/// Path → route. Keys are unique.
pub const ROUTES: [(&str, Route); 4] = [
    ("/ping", Route::Ping),
    ("/metrics", Route::Metrics),
    ("/gc-stats", Route::GcStats),
    ("/threads", Route::Threads),
];

impl Route {
    /// Exact, case-sensitive lookup. No prefix or pattern matching.
    pub fn from_path(path: &str) -> Option<Route> {
        ROUTES
            .iter()
            .find(|(p, _)| *p == path)
            .map(|(_, route)| *route)
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Ping => "/ping",
            Route::Metrics => "/metrics",
            Route::GcStats => "/gc-stats",
            Route::Threads => "/threads",
        }
    }

    /// Label used in logs and self-metrics.
    pub fn name(&self) -> &'static str {
        match self {
            Route::Ping => "ping",
            Route::Metrics => "metrics",
            Route::GcStats => "gc_stats",
            Route::Threads => "threads",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_round_trips() {
        for (path, route) in ROUTES {
            assert_eq!(Route::from_path(path), Some(route));
            assert_eq!(route.path(), path);
        }
    }

    #[test]
    fn test_lookup_is_exact() {
        assert_eq!(Route::from_path("/PING"), None);
        assert_eq!(Route::from_path("/ping/"), None);
        assert_eq!(Route::from_path("/pingx"), None);
        assert_eq!(Route::from_path("/metrics/extra"), None);
        assert_eq!(Route::from_path("ping"), None);
        assert_eq!(Route::from_path(""), None);
        assert_eq!(Route::from_path("/"), None);
    }
}
