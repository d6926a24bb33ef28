//! Optimistic mutation with rollback.

use std::future::Future;

use tokio::sync::watch;

/// Apply a local change before a remote call resolves and undo it if the
/// call fails.
///
/// 1. `capture` takes a checkpoint of the current state.
/// 2. `apply` mutates the state; subscribers see the change immediately.
/// 3. `remote` is awaited.
/// 4. On `Err`, `restore` puts the checkpoint back and the error is returned.
///
/// `remote` must be lazy (an `async` block or `async fn` call) so that the
/// state is already updated when it starts running.
///
/// The restore replaces whatever the state holds at that moment, including
/// changes made by other callers while `remote` was pending.
///
/// # Errors
///
/// Returns the error produced by `remote`.
pub async fn with_rollback<S, C, T, E, Fut>(
    state: &watch::Sender<S>,
    capture: impl FnOnce(&S) -> C,
    apply: impl FnOnce(&mut S),
    restore: impl FnOnce(&mut S, C),
    remote: Fut,
) -> Result<T, E>
where
    Fut: Future<Output = Result<T, E>>,
{
    let checkpoint = capture(&state.borrow());
    state.send_modify(apply);

    match remote.await {
        Ok(value) => Ok(value),
        Err(e) => {
            state.send_modify(|current| restore(current, checkpoint));
            Err(e)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_success_keeps_applied_state() {
        let state = watch::Sender::new(vec![1, 2]);
        let result: Result<&str, ()> = with_rollback(
            &state,
            Clone::clone,
            |v| v.push(3),
            |v, saved| *v = saved,
            async { Ok("done") },
        )
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(*state.borrow(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_failure_restores_checkpoint() {
        let state = watch::Sender::new(vec![1, 2]);
        let result: Result<(), &str> = with_rollback(
            &state,
            Clone::clone,
            |v| v.clear(),
            |v, saved| *v = saved,
            async { Err("rejected") },
        )
        .await;

        assert_eq!(result.unwrap_err(), "rejected");
        assert_eq!(*state.borrow(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_change_is_visible_while_remote_is_pending() {
        let state = watch::Sender::new(0_u32);
        let rx = state.subscribe();
        let result: Result<u32, ()> = with_rollback(
            &state,
            |n| *n,
            |n| *n = 5,
            |n, saved| *n = saved,
            async { Ok(*rx.borrow()) },
        )
        .await;

        assert_eq!(result.unwrap(), 5);
    }
}
