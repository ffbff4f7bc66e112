#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use cricket::lowering::{MaterializationError, Materializer};
    use cricket::makers::{CountMaker, MakerError, MakerResult, MetricMaker};
    use cricket::mdl;
    use cricket::naming::TempNameGenerator;
    use cricket::plan::{
        Aggregation, ArithmeticFn, Dimension, PostAggregation, QueryFilter, RealizedMetric,
    };
    use cricket::registry::{
        DimensionDictionary, MakerDictionary, MetricDictionary, MetricScope,
    };

    /// Records every invocation; realizes each call as a count aggregation.
    #[derive(Default)]
    struct CaptureMaker {
        arity: usize,
        calls: Mutex<Vec<(String, Vec<String>)>>,
    }

    impl CaptureMaker {
        fn with_arity(arity: usize) -> CaptureMaker {
            CaptureMaker {
                arity,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, Vec<String>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl MetricMaker for CaptureMaker {
        fn arity(&self) -> usize {
            self.arity
        }

        fn make(
            &self,
            name: &str,
            dependencies: &[String],
            _scope: &MetricScope<'_>,
        ) -> MakerResult<RealizedMetric> {
            self.calls
                .lock()
                .unwrap()
                .push((name.to_string(), dependencies.to_vec()));
            Ok(RealizedMetric::from_aggregation(Aggregation::Count {
                name: name.to_string(),
            }))
        }
    }

    /// Sums its dependencies' outputs; resolves them through the scope.
    struct SumOfMaker;

    impl MetricMaker for SumOfMaker {
        fn arity(&self) -> usize {
            2
        }

        fn make(
            &self,
            name: &str,
            dependencies: &[String],
            scope: &MetricScope<'_>,
        ) -> MakerResult<RealizedMetric> {
            let mut result = RealizedMetric {
                name: name.to_string(),
                aggregations: Vec::new(),
                post_aggregations: Vec::new(),
            };
            let mut fields = Vec::new();
            for dep in dependencies {
                let metric = scope.lookup(dep).ok_or_else(|| {
                    MakerError::UnresolvedDependency {
                        maker: "sumOf".to_string(),
                        name: dep.clone(),
                    }
                })?;
                result.merge_aggregations(metric);
                fields.push(metric.output_field());
            }
            result.post_aggregations = vec![PostAggregation::Arithmetic {
                name: name.to_string(),
                func: ArithmeticFn::Plus,
                fields,
            }];
            Ok(result)
        }
    }

    fn long_sum(name: &str, field: &str) -> RealizedMetric {
        RealizedMetric::from_aggregation(Aggregation::LongSum {
            name: name.to_string(),
            field_name: field.to_string(),
        })
    }

    fn base_metrics() -> MetricDictionary {
        let mut metrics = MetricDictionary::new();
        metrics.register("clicks", long_sum("clicks", "click_count"));
        metrics.register("impressions", long_sum("impressions", "impression_count"));
        metrics
    }

    #[test]
    fn test_named_dependency_passes_its_own_name() {
        let mut metrics = base_metrics();
        let capture = Arc::new(CaptureMaker::with_arity(1));
        let mut makers = MakerDictionary::new();
        makers.register("dayAvg", capture.clone() as Arc<dyn MetricMaker>);
        let dimensions = DimensionDictionary::new();
        let namer = TempNameGenerator::new();

        let root = mdl::parse("dayAvg(clicks)").unwrap();
        Materializer::new(&mut metrics, &makers, &dimensions, &namer)
            .materialize("daily_clicks", &root)
            .unwrap();

        // A dependency that is already a registered metric is passed by its
        // own name; no scratch name is consumed.
        assert_eq!(
            capture.calls(),
            vec![("daily_clicks".to_string(), vec!["clicks".to_string()])]
        );
        assert_eq!(namer.next_name(), "__temp_metric_0");
    }

    #[test]
    fn test_anonymous_dependency_gets_scratch_name_and_temp_entry() {
        let mut metrics = base_metrics();
        let mut makers = MakerDictionary::new();
        makers.register("sumOf", Arc::new(SumOfMaker) as Arc<dyn MetricMaker>);
        let dimensions = DimensionDictionary::new();
        let namer = TempNameGenerator::new();

        let root = mdl::parse("sumOf(clicks * 2, impressions)").unwrap();
        let realized = Materializer::new(&mut metrics, &makers, &dimensions, &namer)
            .materialize("combined", &root)
            .unwrap();

        // The first argument is anonymous: realized under a scratch name,
        // registered in the temp dictionary, and resolved by the maker
        // through the scope. The temp entry never reaches the permanent
        // dictionary.
        assert_eq!(realized.name, "combined");
        assert_eq!(realized.aggregations.len(), 2);
        assert!(!metrics.contains("__temp_metric_0"));
        assert!(metrics.contains("combined"));

        match &realized.post_aggregations[0] {
            PostAggregation::Arithmetic { func, fields, .. } => {
                assert_eq!(*func, ArithmeticFn::Plus);
                assert_eq!(fields.len(), 2);
                // The scratch intermediate's output is its arithmetic
                // post-aggregation, inlined by the maker.
                assert!(matches!(
                    &fields[0],
                    PostAggregation::Arithmetic { name, .. } if name == "__temp_metric_0"
                ));
            }
            other => panic!("expected arithmetic post-aggregation, got {:?}", other),
        }
    }

    #[test]
    fn test_scratch_names_stay_unique_across_compiles() {
        let mut metrics = base_metrics();
        let capture = Arc::new(CaptureMaker::with_arity(1));
        let mut makers = MakerDictionary::new();
        makers.register("dayAvg", capture.clone() as Arc<dyn MetricMaker>);
        let dimensions = DimensionDictionary::new();
        let namer = TempNameGenerator::new();

        for name in ["m0", "m1", "m2"] {
            let root = mdl::parse("dayAvg(clicks + 1)").unwrap();
            Materializer::new(&mut metrics, &makers, &dimensions, &namer)
                .materialize(name, &root)
                .unwrap();
        }

        // Each compile realizes `clicks + 1` under a fresh scratch name
        // (the constant consumes one as well); names are monotonic and
        // never collide across compiles sharing the generator.
        let dep_names: Vec<String> = capture
            .calls()
            .into_iter()
            .map(|(_, deps)| deps[0].clone())
            .collect();
        assert_eq!(
            dep_names,
            vec![
                "__temp_metric_0".to_string(),
                "__temp_metric_2".to_string(),
                "__temp_metric_4".to_string(),
            ]
        );
    }

    #[test]
    fn test_arity_mismatch_is_a_materialization_error() {
        let mut metrics = base_metrics();
        let mut makers = MakerDictionary::new();
        makers.register(
            "dayAvg",
            Arc::new(CaptureMaker::with_arity(1)) as Arc<dyn MetricMaker>,
        );
        let dimensions = DimensionDictionary::new();
        let namer = TempNameGenerator::new();

        let root = mdl::parse("dayAvg(clicks, impressions)").unwrap();
        let err = Materializer::new(&mut metrics, &makers, &dimensions, &namer)
            .materialize("broken", &root)
            .unwrap_err();
        assert_eq!(
            err,
            MaterializationError::Maker(MakerError::ArityMismatch {
                maker: "dayAvg".to_string(),
                expected: 1,
                actual: 2,
            })
        );
    }

    #[test]
    fn test_zero_arity_maker() {
        let mut metrics = MetricDictionary::new();
        let mut makers = MakerDictionary::new();
        makers.register("rowCount", Arc::new(CountMaker) as Arc<dyn MetricMaker>);
        let dimensions = DimensionDictionary::new();
        let namer = TempNameGenerator::new();

        let root = mdl::parse("rowCount()").unwrap();
        let realized = Materializer::new(&mut metrics, &makers, &dimensions, &namer)
            .materialize("events", &root)
            .unwrap();
        assert_eq!(
            realized.aggregations,
            vec![Aggregation::Count {
                name: "events".to_string(),
            }]
        );
    }

    #[test]
    fn test_compound_filter_lowering() {
        let mut metrics = base_metrics();
        let makers = MakerDictionary::new();
        let mut dimensions = DimensionDictionary::new();
        dimensions.register(Dimension::with_physical_name("country", "country_iso"));
        dimensions.register(Dimension::new("platform"));
        let namer = TempNameGenerator::new();

        let root = mdl::parse("clicks | (country == US && platform == 'web')").unwrap();
        let realized = Materializer::new(&mut metrics, &makers, &dimensions, &namer)
            .materialize("us_web_clicks", &root)
            .unwrap();

        match &realized.aggregations[0] {
            Aggregation::Filtered { filter, .. } => {
                assert_eq!(
                    filter,
                    &QueryFilter::And {
                        fields: vec![
                            QueryFilter::Selector {
                                dimension: "country_iso".to_string(),
                                value: "US".to_string(),
                            },
                            QueryFilter::Selector {
                                dimension: "platform".to_string(),
                                value: "web".to_string(),
                            },
                        ],
                    }
                );
            }
            other => panic!("expected a filtered aggregation, got {:?}", other),
        }
    }

    #[test]
    fn test_compiled_fragment_wire_shape() {
        let mut metrics = base_metrics();
        let makers = MakerDictionary::new();
        let dimensions = DimensionDictionary::new();
        let namer = TempNameGenerator::new();

        let root = mdl::parse("clicks / impressions").unwrap();
        let realized = Materializer::new(&mut metrics, &makers, &dimensions, &namer)
            .materialize("ctr", &root)
            .unwrap();

        let json = serde_json::to_value(&realized).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "ctr",
                "aggregations": [
                    {"type": "longSum", "name": "clicks", "fieldName": "click_count"},
                    {"type": "longSum", "name": "impressions", "fieldName": "impression_count"},
                ],
                "post_aggregations": [{
                    "type": "arithmetic",
                    "name": "ctr",
                    "fn": "/",
                    "fields": [
                        {"type": "fieldAccess", "name": "clicks", "fieldName": "clicks"},
                        {"type": "fieldAccess", "name": "impressions", "fieldName": "impressions"},
                    ],
                }],
            })
        );
    }
}
