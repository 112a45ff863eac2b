//! Built-in demo tickets.

use ticketcoach_schema::{TicketComment, TicketPayload};

/// A labelled transcript shipped with the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleTicket {
    /// Short name for the command line, e.g. `billing`.
    pub key: &'static str,
    pub label: &'static str,
    pub transcript: &'static str,
}

pub static SAMPLE_TICKETS: [SampleTicket; 4] = [
    SampleTicket {
        key: "securevault",
        label: "Assignment example – SecureVault / Okta / SOC2",
        transcript: SECUREVAULT_ESCALATION,
    },
    SampleTicket {
        key: "billing",
        label: "Agent issue – Ignored prior history (billing)",
        transcript: BILLING_IGNORED_HISTORY,
    },
    SampleTicket {
        key: "api-limits",
        label: "Content gap – No docs on API limits",
        transcript: CSV_IMPORT_NO_LIMITS,
    },
    SampleTicket {
        key: "strong-agent",
        label: "Strong agent – Security lock, good handling",
        transcript: ACCOUNT_LOCK_STRONG_AGENT,
    },
];

/// Look a sample up by key or full label, ignoring case.
pub fn sample(name: &str) -> Option<&'static SampleTicket> {
    let wanted = name.trim().to_lowercase();
    SAMPLE_TICKETS
        .iter()
        .find(|s| s.key == wanted || s.label.to_lowercase() == wanted)
}

/// Helpdesk export of the billing ticket, as a ticketing system would hand it over.
pub fn mock_ticket_payload() -> TicketPayload {
    TicketPayload {
        id: Some(98765),
        subject: Some("Same billing issue again - why wasn't this fixed?".to_string()),
        comments: vec![
            TicketComment::new(
                "customer",
                "Hi, I'm having the same billing issue I reported about 6 months ago. \
                 Your system is charging me twice for the same subscription period.",
            ),
            TicketComment::new(
                "agent",
                "Hi, sorry to hear that. Can you please send a screenshot of the double charge?",
            ),
            TicketComment::new(
                "customer",
                "I already sent screenshots the last time this happened. \
                 They said it was a known issue and that it was fixed. \
                 Can you check my previous ticket?",
            ),
            TicketComment::new(
                "agent",
                "If it's happening again it might be something different. \
                 Please send the screenshots again and I'll take a look.",
            ),
        ],
    }
}

const SECUREVAULT_ESCALATION: &str = r#"Customer: Jason Miller
Role: IT Manager, Larkspur Biotech
Priority: High
Plan: Enterprise Plus
SLA: 4 hrs
Subject: Inconsistent Access to SecureVault — Okta Group Sync Partially Failing

Customer Message
Hi,
We have a critical access issue across our “DataOps” and “ComplianceAudit” Okta groups. Roughly half of the users in each group are getting a 403 “Access Denied” when trying to log into SecureVault. The rest can log in normally.

We checked Okta — group membership looks correct, and SCIM sync says “Success” from this morning. We didn’t change any roles or entitlements.

We’re mid-audit for SOC 2. I need this resolved fast — we cannot afford downtime with our internal audit team locked out.

Thanks,
Jason

Agent Response (Tier 1 Agent — Julia)
Hi Jason,

Thanks for reaching out, and I’m sorry to hear about the access issues. Just to confirm — the affected users are all within the same two Okta groups? Have you had your Okta admin revalidate group assignments and SCIM settings?

Sometimes stale metadata causes SCIM to “succeed” but silently skip changes. Try manually syncing the group again and clearing your app cache. Let us know if the issue persists.

Best,
Julia

Customer Response
We already tried re-syncing groups and cleared app metadata. Still the same issue. Also, the problem is not consistent — one user logged in fine this morning and was blocked 20 minutes later. Another couldn’t log in, then suddenly got access an hour later.

Our CISO is now involved and wants a timeline + explanation. Please escalate.

Agent Response (Tier 2 Engineer — Mike)
Hi Jason,

Thanks for the update and additional detail. That fluctuation does sound unusual. It’s possible that your SCIM token is partially expired — we’ve seen issues where older SecureVault orgs had tokens that were not auto-rotated.

Please go to:
Admin → Integrations → SCIM → Regenerate your token and update it in Okta. Once that’s done, run a full re-sync. This should realign all group memberships. Let me know how it goes.

Cheers,
Mike

Customer Response
Mike — I already regenerated the SCIM token last week, and we re-synced this morning. Issue still happening.

Please dig deeper. This looks like something is intermittently breaking on your side — not Okta’s. Users don’t randomly gain and lose access.

Also, this happened to us six months ago — and your team said it was a race condition in your role evaluation engine. Is that back?

Agent Response
Thanks for the follow-up. I wasn’t aware of the prior incident, but I’ll review our internal logs for any recent regressions related to the role engine.

In the meantime, can you provide user emails for 3 affected and 3 unaffected users? That will help isolate the issue. I’ll escalate to Engineering if I find anything in the logs.

Appreciate your patience.

Customer Final Message
Sent the user list. Please do not ask us to “retry sync” again unless you’ve confirmed a root cause. We’re under scrutiny and cannot explain uncertainty to our auditors.

Also — please log this as a Sev 1 and give me a ticket ID I can reference in tomorrow’s audit debrief.
"#;

const BILLING_IGNORED_HISTORY: &str = r#"Subject: Same billing issue again - why wasn't this fixed?

Customer: Hi, I'm having the same billing issue I reported about 6 months ago. Your system is charging me twice for the same subscription period.

Agent: Hi, sorry to hear that. Can you please send a screenshot of the double charge?

Customer: I already sent screenshots the last time this happened. They said it was a known issue and that it was fixed. Can you check my previous ticket?

Agent: If it's happening again it might be something different. Please send the screenshots again and I'll take a look.

Customer: This is really frustrating. I feel like I'm explaining this from scratch every time.

Agent: Once I get the screenshots I'll see what I can do about a refund.
"#;

const CSV_IMPORT_NO_LIMITS: &str = r#"Subject: API timeout when uploading large CSV

Customer: Hi, every time I upload a 200k-row CSV via the /bulk-import API, the request times out after about 30 seconds. Smaller files work fine.

Agent: Hi there, thanks for reaching out. Timeouts can happen for a lot of reasons. Can you try again in an incognito window?

Customer: This is happening from our backend server, not a browser. We're calling the API directly.

Agent: Okay, in that case can you try from a different browser or device to see if it still happens?

Customer: Again, this is a backend integration, there is no browser. Do you have any documented limits for CSV size or processing time?

Agent: I don't see anything in our help center about that. If it's timing out, you may just need to try smaller batches.

Customer: That's really not an acceptable answer. We need to know what the limits are.
"#;

const ACCOUNT_LOCK_STRONG_AGENT: &str = r#"Subject: Account locked after suspicious login alert

Customer: I got an email saying there was a suspicious login to my account from a new device and now I'm locked out. I need access for a client meeting in an hour.

Agent: Hi, thanks for getting in touch and I'm sorry for the stress this is causing, especially with a client meeting coming up. I can help get you back in securely.

Agent: For your protection the lock was applied automatically when we saw the sign-in from the new device. To verify it's you, I've sent a one-time code to the phone number on file. Can you read it back to me?

Customer: Got it, the code is 482913.

Agent: Thank you, that matches. I've unlocked the account and ended all other active sessions. Please set a new password now, and I'd strongly recommend turning on two-factor authentication under Settings > Security.

Customer: Done, I'm back in. Thanks!

Agent: Great. I've also flagged the suspicious sign-in for our security team to review. If you didn't recognise that device, you'll get a follow-up from them within one business day. I'll keep this ticket open until then so you have a single reference. Good luck with your meeting!
"#;
