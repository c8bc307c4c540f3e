use yew::prelude::*;

use crate::user::User;

#[derive(Properties, PartialEq)]
pub struct UserTableProps {
    pub users: Vec<User>,
}

/// Table body rows, one per user. Meant to be mounted into a `<tbody>`.
#[component]
pub fn UserTable(UserTableProps { users }: &UserTableProps) -> Html {
    html! {
        <>
            { for users.iter().map(|user| html! { <UserTableRow user={user.clone()} /> }) }
        </>
    }
}

#[derive(Properties, PartialEq)]
pub struct UserTableRowProps {
    pub user: User,
}

#[component]
pub fn UserTableRow(UserTableRowProps { user }: &UserTableRowProps) -> Html {
    html! {
        <tr>
            { for user.cells().into_iter().map(|cell| html! { <td>{ cell }</td> }) }
        </tr>
    }
}
