use anyhow::{Result, bail};
use libdesk_client::Listing;
use libdesk_core::{Loan, LoanInput, LoanStatus, Role, parse_date};
use time::OffsetDateTime;

use super::App;
use crate::cli::{ListArgs, LoanCommands};
use crate::output::{print_item, print_list, print_page, print_success};

const ANY_ROLE: &[Role] = &[];
const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Route guarding each loan command, plus any extra role requirement.
fn route(command: &LoanCommands) -> (&'static str, &'static [Role]) {
    match command {
        LoanCommands::Mine(_)
        | LoanCommands::Get { .. }
        | LoanCommands::Return { .. }
        | LoanCommands::Member { .. } => ("/loans/my-loans", ANY_ROLE),
        LoanCommands::Overdue(_) => ("/loans/overdue", ANY_ROLE),
        LoanCommands::Delete { .. } => ("/loans", ADMIN_ONLY),
        LoanCommands::List { .. } | LoanCommands::Create { .. } | LoanCommands::Book { .. } => {
            ("/loans", ANY_ROLE)
        }
    }
}

fn ensure_returnable(loan: &Loan) -> Result<()> {
    if !loan.status.can_return() {
        bail!("Loan #{} is already {}", loan.id, loan.status);
    }
    Ok(())
}

fn show(loans: Vec<Loan>, args: &ListArgs, status: Option<LoanStatus>, app: &App) {
    let mut listing = Listing::with_page_size(args.page_size);
    listing.replace(loans);
    if let Some(term) = &args.search {
        listing.set_search(term, &["book", "member"]);
    }
    if let Some(status) = status {
        listing.set_filter("status", status.as_str());
    }
    listing.set_page(args.page);
    print_page(&listing.page(), app.format);
}

pub async fn run(app: &mut App, command: &LoanCommands) -> Result<()> {
    let (path, roles) = route(command);
    app.enter(path, roles).await?;
    let client = app.client();
    let loans = client.loans();

    match command {
        LoanCommands::List { list, status } => {
            let all = loans.list().await.map_err(|e| app.fail(e))?;
            show(all, list, *status, app);
        }
        LoanCommands::Mine(args) => {
            let mine = loans.my_loans().await.map_err(|e| app.fail(e))?;
            show(mine, args, None, app);
        }
        LoanCommands::Overdue(args) => {
            let overdue = loans.overdue().await.map_err(|e| app.fail(e))?;
            show(overdue, args, None, app);
        }
        LoanCommands::Get { id } => {
            let loan = loans.get(*id).await.map_err(|e| app.fail(e))?;
            print_item(&loan, app.format);
        }
        LoanCommands::Create { member, book, date } => {
            let borrow_date = match date {
                Some(date) => parse_date(date)?,
                None => OffsetDateTime::now_utc().date(),
            };
            let input = LoanInput {
                member_id: *member,
                book_id: *book,
                borrow_date,
                status: LoanStatus::Borrowed,
            };
            let created = loans.create(&input).await.map_err(|e| app.fail(e))?;
            print_success(&format!("Lent book #{book} to member #{member} (loan #{})", created.id));
            print_item(&created, app.format);
        }
        LoanCommands::Return { id } => {
            let loan = loans.get(*id).await.map_err(|e| app.fail(e))?;
            ensure_returnable(&loan)?;
            let returned = loans.return_book(*id).await.map_err(|e| app.fail(e))?;
            print_success(&format!("Loan #{id} returned"));
            print_item(&returned, app.format);
        }
        LoanCommands::Delete { id } => {
            loans.delete(*id).await.map_err(|e| app.fail(e))?;
            print_success(&format!("Deleted loan #{id}"));
        }
        LoanCommands::Member { id } => {
            let found = loans.by_member(*id).await.map_err(|e| app.fail(e))?;
            print_list(&found, app.format);
        }
        LoanCommands::Book { id } => {
            let found = loans.by_book(*id).await.map_err(|e| app.fail(e))?;
            print_list(&found, app.format);
        }
    }
    Ok(())
}
