#[cfg(test)]
mod tests {
    use future_promise::{
        context::Semaphore, flatten, future, future_failed, future_of, lift, reduce, sequence,
        traverse, zip3, zip4, Error, Future, Panicked, PredicateNotSatisfied, Promise,
    };
    use std::{sync::Arc, thread};

    #[derive(Debug, PartialEq, thiserror::Error)]
    enum HeadDesk {
        #[error("ouch")]
        Ouch,
    }

    #[derive(Debug, PartialEq, thiserror::Error)]
    #[error("transform failed")]
    struct TransformError;

    /// Futures for `0..=10` whose producers block on their own gate; index
    /// `fail_at` fails with `HeadDesk::Ouch`.
    fn gated_indices(fail_at: Option<usize>) -> (Vec<Future<usize>>, Vec<Arc<Semaphore>>) {
        (0..=10)
            .map(|i| {
                let gate = Arc::new(Semaphore::new(0));
                let producer_gate = gate.clone();
                let f = future(move || {
                    producer_gate.wait();
                    if Some(i) == fail_at {
                        Err(HeadDesk::Ouch)
                    } else {
                        Ok(i)
                    }
                });
                (f, gate)
            })
            .unzip()
    }

    fn open_in_reverse(gates: &[Arc<Semaphore>]) {
        for gate in gates.iter().rev() {
            gate.signal();
        }
    }

    #[test]
    fn test_map() {
        let (promise, f) = Promise::pair();
        let mapped = f.map(|v: i32| v.to_string());
        promise.keep(1).unwrap();
        assert_eq!(mapped.wait().unwrap(), "1");
    }

    #[test]
    fn test_map_preserves_upstream_future() {
        let f = future_of(1);
        let mapped = f.map(|v| v * 10);
        assert_eq!(mapped.wait().unwrap(), 10);
        assert_eq!(f.wait().unwrap(), 1);
    }

    #[test]
    fn test_try_map_with_failing_function() {
        let mapped = future_of(1).try_map(|_| Err::<i32, _>(TransformError));
        assert!(mapped.wait().unwrap_err().is::<TransformError>());
    }

    #[test]
    fn test_map_with_panicking_function() {
        let mapped = future_of(1).map(|_: i32| -> i32 { panic!("bad transform") });
        let error = mapped.wait().unwrap_err();
        assert_eq!(error.downcast_ref::<Panicked>().unwrap().message, "bad transform");
    }

    #[test]
    fn test_map_forwards_upstream_error() {
        let mapped = future_failed::<i32>(HeadDesk::Ouch).map(|v| v + 1);
        assert!(mapped.wait().unwrap_err().is::<HeadDesk>());
    }

    #[test]
    fn test_flat_map() {
        let (promise, f) = Promise::pair();
        let mapped = f.flat_map(|v: i32| future(move || Ok::<_, Error>(v.to_string())));
        promise.keep(1).unwrap();
        assert_eq!(mapped.wait().unwrap(), "1");
    }

    #[test]
    fn test_try_flat_map() {
        let (promise, f) = Promise::pair();
        let mapped = f.try_flat_map(|v: i32| Ok::<_, Error>(future_of(v * 2)));
        promise.keep(4).unwrap();
        assert_eq!(mapped.wait().unwrap(), 8);
    }

    #[test]
    fn test_try_flat_map_with_failing_function() {
        let mapped = future_of(1).try_flat_map(|_| Err::<Future<i32>, _>(TransformError));
        assert!(mapped.wait().unwrap_err().is::<TransformError>());

        let inner = future_of(1)
            .try_flat_map(|_| Ok::<_, Error>(future_failed::<i32>(HeadDesk::Ouch)));
        assert!(inner.wait().unwrap_err().is::<HeadDesk>());
    }

    #[test]
    fn test_zip() {
        assert_eq!(future_of(1).zip(&future_of("x")).wait().unwrap(), (1, "x"));
    }

    #[test]
    fn test_zip_waits_for_both_sides() {
        let (left, a) = Promise::pair();
        let (right, b) = Promise::pair();
        let zipped = a.zip(&b);
        right.keep("Hello").unwrap();
        assert!(!zipped.is_settled());
        left.keep(1).unwrap();
        assert_eq!(zipped.wait().unwrap(), (1, "Hello"));
    }

    #[test]
    fn test_zip_fails_when_either_side_fails() {
        let left = future_failed::<i32>(HeadDesk::Ouch).zip(&future_of("x"));
        assert!(left.wait().unwrap_err().is::<HeadDesk>());
        let right = future_of(1).zip(&future_failed::<&str>(TransformError));
        assert!(right.wait().unwrap_err().is::<TransformError>());
    }

    #[test]
    fn test_zip_with_both_sides_failing() {
        let both =
            future_failed::<i32>(HeadDesk::Ouch).zip(&future_failed::<&str>(TransformError));
        let error = both.wait().unwrap_err();
        assert!(error.is::<HeadDesk>() || error.is::<TransformError>());
    }

    #[test]
    fn test_zip3_and_zip4() {
        let (a, b, c, d) = (future_of(1), future_of("two"), future_of(3.0), future_of('4'));
        assert_eq!(zip3(&a, &b, &c).wait().unwrap(), (1, "two", 3.0));
        assert_eq!(zip4(&a, &b, &c, &d).wait().unwrap(), (1, "two", 3.0, '4'));
    }

    #[test]
    fn test_filter_predicate_false() {
        let filtered = future_of(1).filter(|v| Ok::<_, Error>(*v != 1));
        let error = filtered.wait().unwrap_err();
        assert_eq!(
            error.downcast_ref::<PredicateNotSatisfied<i32>>(),
            Some(&PredicateNotSatisfied { value: 1 })
        );
    }

    #[test]
    fn test_filter_predicate_true() {
        assert_eq!(future_of(1).filter(|v| Ok::<_, Error>(*v == 1)).wait().unwrap(), 1);
    }

    #[test]
    fn test_filter_when_upstream_fails() {
        let filtered = future_failed::<i32>(HeadDesk::Ouch).filter(|_| Ok::<_, Error>(true));
        assert!(filtered.wait().unwrap_err().is::<HeadDesk>());
    }

    #[test]
    fn test_filter_with_failing_predicate() {
        let filtered = future_of(1).filter(|_| Err::<bool, _>(TransformError));
        assert!(filtered.wait().unwrap_err().is::<TransformError>());
    }

    #[test]
    fn test_flatten() {
        assert_eq!(flatten(&future_of(future_of(7))).wait().unwrap(), 7);
        assert_eq!(future_of(future_of(8)).flatten().wait().unwrap(), 8);
    }

    #[test]
    fn test_flatten_inner_and_outer_failures() {
        let inner = flatten(&future_of(future_failed::<i32>(HeadDesk::Ouch)));
        assert!(inner.wait().unwrap_err().is::<HeadDesk>());
        let outer = flatten(&future_failed::<Future<i32>>(TransformError));
        assert!(outer.wait().unwrap_err().is::<TransformError>());
    }

    #[test]
    fn test_sequence_preserves_order() {
        let (futures, gates) = gated_indices(None);
        let sequenced = sequence(futures);
        open_in_reverse(&gates);
        assert_eq!(sequenced.wait().unwrap(), (0..=10).collect::<Vec<_>>());
    }

    #[test]
    fn test_sequence_when_one_fails() {
        let (futures, gates) = gated_indices(Some(3));
        let sequenced = sequence(futures);
        open_in_reverse(&gates);
        assert!(sequenced.wait().unwrap_err().is::<HeadDesk>());
    }

    #[test]
    fn test_sequence_of_nothing() {
        assert_eq!(sequence(Vec::<Future<u8>>::new()).wait().unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_traverse() {
        let traversed = traverse(vec!["a", "bb", "ccc"], |s| {
            Ok::<_, Error>(future(move || Ok::<_, Error>(s.len())))
        });
        assert_eq!(traversed.wait().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_traverse_with_failing_function() {
        let mut visited = 0;
        let traversed = traverse(1..=5, |i| {
            visited += 1;
            if i == 2 {
                Err(TransformError)
            } else {
                Ok(future_of(i))
            }
        });
        assert!(traversed.is_settled());
        assert!(traversed.wait().unwrap_err().is::<TransformError>());
        assert_eq!(visited, 2);
    }

    #[test]
    fn test_reduce() {
        let (futures, gates) = gated_indices(None);
        let reduced = reduce(futures, future_of(String::new()), |acc, next| {
            Ok::<_, Error>(format!("{acc}{next}"))
        });
        open_in_reverse(&gates);
        let expected = (0..=10).fold(String::new(), |acc, next| format!("{acc}{next}"));
        assert_eq!(reduced.wait().unwrap(), expected);
    }

    #[test]
    fn test_reduce_when_one_future_fails() {
        let (futures, gates) = gated_indices(Some(3));
        let reduced = reduce(futures, future_of(0usize), |acc, next| Ok::<_, Error>(acc + next));
        open_in_reverse(&gates);
        assert!(reduced.wait().unwrap_err().is::<HeadDesk>());
    }

    #[test]
    fn test_reduce_when_reducer_fails() {
        let values = (1..=5).map(future_of);
        let reduced = reduce(values, future_of(0), |_, _| Err::<i32, _>(TransformError));
        assert!(reduced.wait().unwrap_err().is::<TransformError>());
    }

    #[test]
    fn test_lift() {
        let add = lift(|a: i32, b: i32| Ok::<_, Error>(a + b));
        assert_eq!(add(&future_of(2), &future_of(3)).wait().unwrap(), 5);
    }

    #[test]
    fn test_combining_futures() {
        let a = future(|| Ok::<_, Error>(2));
        let b = thread::spawn(|| future_of(3)).join().expect("The builder thread has panicked");
        let product = a.zip(&b).map(|(a, b)| a * b).filter(|v| Ok::<_, Error>(*v > 5));
        assert_eq!(product.wait().unwrap(), 6);
    }
}
