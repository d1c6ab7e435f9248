//! Background scheduled tasks. Call `spawn_all` once during startup; each
//! task detaches via `tokio::spawn` and runs on its own schedule.

use crate::AppStudentService;

pub fn spawn_all(student_service: AppStudentService, due_scan_interval_secs: u64) {
    // Recurring payment-due scan; publishes reminder events on the change
    // feed so admin UIs can surface them.
    {
        let svc = student_service.clone();
        tokio::spawn(async move {
            loop {
                match svc.scan_payment_due().await {
                    Ok(n) if n > 0 => log::info!("Payment-due reminders published: {n}"),
                    Ok(_) => {}
                    Err(e) => log::error!("Payment-due scan failed: {e:?}"),
                }
                tokio::time::sleep(std::time::Duration::from_secs(due_scan_interval_secs)).await;
            }
        });
    }
}
