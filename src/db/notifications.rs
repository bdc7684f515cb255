/// Scheduled reminder triggers kept in SQLite.
use anyhow::Result;
use rusqlite::Connection;

use crate::reminders::{DailyTrigger, Notification, NotificationDispatcher};

pub struct SqliteDispatcher<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteDispatcher<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl NotificationDispatcher for SqliteDispatcher<'_> {
    fn cancel_all(&mut self) -> Result<()> {
        self.conn.execute("DELETE FROM scheduled_notifications", [])?;
        Ok(())
    }

    fn schedule_daily(&mut self, trigger: &DailyTrigger) -> Result<()> {
        self.conn.execute(
            "INSERT INTO scheduled_notifications (hour, minute, title, body, sound)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                trigger.hour,
                trigger.minute,
                trigger.notification.title,
                trigger.notification.body,
                trigger.notification.sound,
            ],
        )?;
        Ok(())
    }

    fn scheduled(&self) -> Result<Vec<DailyTrigger>> {
        let mut stmt = self.conn.prepare(
            "SELECT hour, minute, title, body, sound FROM scheduled_notifications
             ORDER BY hour, minute, id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(DailyTrigger {
                hour: row.get(0)?,
                minute: row.get(1)?,
                notification: Notification {
                    title: row.get(2)?,
                    body: row.get(3)?,
                    sound: row.get(4)?,
                },
            })
        })?;
        let mut triggers = Vec::new();
        for row in rows {
            triggers.push(row?);
        }
        Ok(triggers)
    }
}
